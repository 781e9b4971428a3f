/// Name used when the latest comment carries no author display name
pub const DEFAULT_FALLBACK_NAME: &str = "UnknownUser";

/// Build the title embedding the view count and the latest commenter.
///
/// The view count is used as the platform formats it; no arithmetic is done on it.
pub fn compose_title(view_count: &str, commenter_name: &str) -> String {
    format!("This Short has {view_count} views thanks to {commenter_name} #shorts")
}
