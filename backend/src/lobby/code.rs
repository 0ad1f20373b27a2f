const CODE_PREFIX_LEN: usize = 4;

/// Lobby code: four hex characters of a random uuid, a dash, and the last
/// four digits of the creation time in milliseconds.
pub fn generate_lobby_code(now_ms: i64) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{:04}",
        &uuid[..CODE_PREFIX_LEN],
        now_ms.rem_euclid(10_000)
    )
}
