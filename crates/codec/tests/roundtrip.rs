use codec::{deserialize, serialize, serialize_with_prepend, ConstBuffer, ConstBufferArray};
use proptest::prelude::*;

fn arb_array(max_elems: usize, max_elem_len: usize) -> impl Strategy<Value = ConstBufferArray> {
    prop::collection::vec(
        prop::collection::vec(any::<u8>(), 0..=max_elem_len),
        0..=max_elems,
    )
    .prop_map(|elems| {
        ConstBufferArray::new(elems.into_iter().map(ConstBuffer::from_vec).collect())
    })
}

proptest! {
    /// Invariant: serialize -> deserialize reproduces the same
    /// sequence of bytes, element by element.
    #[test]
    fn round_trip_preserves_contents(array in arb_array(16, 256)) {
        let image = serialize(&array).unwrap();
        let decoded = deserialize(&image).unwrap();

        prop_assert_eq!(decoded.len(), array.len());
        for i in 0..array.len() {
            prop_assert_eq!(decoded.buffer(i).content(), array.buffer(i).content());
        }
    }

    /// Invariant: the serialized size is always exactly
    /// `4 + 4*N + sum(sizes)`.
    #[test]
    fn serialized_size_matches_formula(array in arb_array(16, 256)) {
        let image = serialize(&array).unwrap();
        let expected = 4 + 4 * array.len() + array.iter().map(|b| b.size()).sum::<usize>();
        prop_assert_eq!(image.size(), expected);
    }

    /// Invariant: deserialized elements alias the image's own storage
    /// rather than holding independent copies.
    #[test]
    fn deserialized_elements_alias_image_storage(array in arb_array(8, 64)) {
        let image = serialize(&array).unwrap();
        let decoded = deserialize(&image).unwrap();

        let image_start = image.content().as_ptr() as usize;
        let image_end = image_start + image.size();
        for buf in decoded.iter() {
            if buf.size() == 0 {
                continue;
            }
            let ptr = buf.content().as_ptr() as usize;
            prop_assert!(ptr >= image_start && ptr + buf.size() <= image_end);
        }
    }

    /// Invariant: sector-aligned output length is always a multiple of
    /// sector_size, and padding is the complement of the used length.
    #[test]
    fn sector_prepend_output_is_always_aligned(
        array in arb_array(8, 64),
        metadata_len in 0usize..64,
        sector_size in 1u32..=8192,
    ) {
        let metadata = ConstBuffer::from_vec(vec![0u8; metadata_len]);
        let (image, padding) = serialize_with_prepend(&metadata, &array, sector_size).unwrap();

        prop_assert_eq!(image.size() as u32 % sector_size, 0);

        let used = metadata_len as u32 + header_and_payload_len(&array);
        prop_assert_eq!(used + padding, image.size() as u32);
    }
}

fn header_and_payload_len(array: &ConstBufferArray) -> u32 {
    4 + 4 * array.len() as u32 + array.iter().map(|b| b.size() as u32).sum::<u32>()
}

#[test]
fn truncated_and_corrupt_images_are_rejected_not_panicked() {
    let cases: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x01],
        vec![0x01, 0x00, 0x00],
        vec![0x02, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF],
    ];
    for bytes in cases {
        let image = ConstBuffer::from_vec(bytes);
        assert!(deserialize(&image).is_err());
    }
}
