/// Result alias for binary and shell plumbing. Backend calls use
/// `domain::error::ClientError` instead.
pub type Result<T> = anyhow::Result<T>;
