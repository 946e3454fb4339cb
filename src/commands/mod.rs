pub mod admin;
pub mod dashboard;
pub mod events;
pub mod notify;
pub mod profile;
pub mod role;
pub mod watch;

use anyhow::Result;
use attendance_core::service::ProfileView;
use attendance_core::{UserId, UserProfile};

use crate::client::Client;

/// The signed-in user and their profile.
///
/// Fails with setup instructions when the profile hasn't been filled in yet,
/// since nothing can be filtered for a user without one.
pub async fn load_viewer(client: &Client) -> Result<(UserId, UserProfile)> {
    let identity = client.me().await?;

    match client.profile().await? {
        ProfileView::Existing { profile } => Ok((identity.id, profile)),
        ProfileView::FirstTimeSetup { setup } => {
            let roles: Vec<String> = setup.allowed_roles.iter().map(|r| r.to_string()).collect();
            anyhow::bail!(
                "Your profile is not set up yet.\n\n\
                Complete it with:\n  \
                attendance profile set --username <name>\n\n\
                Allowed roles for {}: {}",
                identity.email,
                roles.join(", ")
            );
        }
    }
}
