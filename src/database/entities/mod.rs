pub mod github_repos;
pub mod integration_providers;
pub mod notifications;
pub mod organization_users;
pub mod organizations;
pub mod projects;
pub mod team_invitations;
pub mod team_members;
pub mod teams;
pub mod users;

pub use github_repos::Entity as GithubRepos;
pub use integration_providers::Entity as IntegrationProviders;
pub use notifications::Entity as Notifications;
pub use organization_users::Entity as OrganizationUsers;
pub use organizations::Entity as Organizations;
pub use projects::Entity as Projects;
pub use team_invitations::Entity as TeamInvitations;
pub use team_members::Entity as TeamMembers;
pub use teams::Entity as Teams;
pub use users::Entity as Users;
