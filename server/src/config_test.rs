use super::*;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.port, 8080);
    assert_eq!(config.client_queue_capacity, 256);
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
}

#[test]
fn env_parse_missing_key_uses_default() {
    assert_eq!(env_parse("INKBOARD_TEST_SURELY_UNSET_KEY", 17_u16), 17);
}

#[test]
fn env_parse_reads_and_trims_value() {
    // SAFETY: key is unique to this test; no other thread reads it.
    unsafe { std::env::set_var("INKBOARD_TEST_PARSE_OK", " 4242 ") };
    assert_eq!(env_parse("INKBOARD_TEST_PARSE_OK", 1_u16), 4242);
}

#[test]
fn env_parse_garbage_falls_back() {
    // SAFETY: key is unique to this test; no other thread reads it.
    unsafe { std::env::set_var("INKBOARD_TEST_PARSE_BAD", "lots") };
    assert_eq!(env_parse("INKBOARD_TEST_PARSE_BAD", 9_usize), 9);
}
