// Mutations grouped by functional area

mod account;
mod integration;
mod notification;
mod project;
mod team;
mod team_member;

use async_graphql::*;

/// Main mutation root that combines all mutation submodules
#[derive(Default, MergedObject)]
pub struct Mutation(
    pub account::AccountMutation,
    pub team::TeamMutation,
    pub team_member::TeamMemberMutation,
    pub project::ProjectMutation,
    pub notification::NotificationMutation,
    pub integration::IntegrationMutation,
);
