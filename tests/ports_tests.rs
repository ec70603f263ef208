use port_scan_rs::ports::{port_from_u32, port_range};

#[test]
fn randomized_range_is_a_permutation() {
    let ordered = port_range(1, 4096, false);
    let mut shuffled = port_range(1, 4096, true);
    assert_eq!(shuffled.len(), ordered.len());
    shuffled.sort_unstable();
    assert_eq!(shuffled, ordered);
}

#[test]
fn invalid_port_rejected() {
    assert!(port_from_u32(0).is_err());
    assert!(port_from_u32(65536).is_err());
}
