//! Signed-in user profile.

use ristretto_client::ApiClient;
use ristretto_core::User;

use super::CliError;

/// Show the signed-in user's profile.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn show(client: &ApiClient) -> Result<String, CliError> {
    let user = client.user().await?;
    Ok(render_profile(&user))
}

#[must_use]
pub fn render_profile(user: &User) -> String {
    format!(
        "{}\n  Email    {}\n  Joined   {}",
        user.display_name(),
        user.email,
        user.created_at.format("%Y-%m-%d")
    )
}
