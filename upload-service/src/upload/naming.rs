use chrono::Utc;
use rand::Rng;

/// Extension of `name` including its leading dot, or `""` when there is none.
/// Dotfiles such as `.env` have no extension.
pub fn extension_of(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx..],
    }
}

/// `{field}-{unix millis}-{random}{.ext}`.
///
/// Collisions need two uploads in the same millisecond drawing the same
/// 64-bit suffix; storage opens files create-new, so one would be retried
/// rather than overwritten.
pub fn unique_filename(field_name: &str, original_name: &str) -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!(
        "{}-{}-{}{}",
        field_name,
        Utc::now().timestamp_millis(),
        suffix,
        extension_of(original_name)
    )
}
