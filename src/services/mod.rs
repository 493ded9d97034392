pub mod account_service;
pub mod authorization;
pub mod github_service;
pub mod notification_service;
pub mod project_service;
pub mod team_member_service;
pub mod team_service;
pub mod validation;

pub use account_service::{AccountService, AuthenticatedUser};
pub use authorization::AuthorizationService;
pub use github_service::{AddedGitHubRepo, GitHubService, WebhookOutcome};
pub use notification_service::NotificationService;
pub use project_service::ProjectService;
pub use team_member_service::{
    AcceptedInvitation, PromotedTeamMember, RemovedTeamMember, TeamInvite, TeamMemberService,
};
pub use team_service::{ArchivedTeam, TeamService};
pub use validation::ValidationService;
