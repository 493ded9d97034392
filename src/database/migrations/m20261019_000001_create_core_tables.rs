use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PreferredName).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Tms).string().not_null().default("[]"))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organizations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(ColumnDef::new(Organizations::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Organizations::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrganizationUsers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(OrganizationUsers::OrgId).string().not_null())
                    .col(ColumnDef::new(OrganizationUsers::UserId).string().not_null())
                    .col(ColumnDef::new(OrganizationUsers::Role).string().not_null().default("member"))
                    .col(ColumnDef::new(OrganizationUsers::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::OrgId).string().not_null())
                    .col(ColumnDef::new(Teams::IsArchived).boolean().not_null().default(false))
                    .col(ColumnDef::new(Teams::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Teams::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeamMembers::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(TeamMembers::TeamId).string().not_null())
                    .col(ColumnDef::new(TeamMembers::UserId).string().not_null())
                    .col(ColumnDef::new(TeamMembers::PreferredName).string().not_null())
                    .col(ColumnDef::new(TeamMembers::Email).string().not_null())
                    .col(ColumnDef::new(TeamMembers::IsLead).boolean().not_null().default(false))
                    .col(ColumnDef::new(TeamMembers::IsNotRemoved).boolean().not_null().default(true))
                    .col(ColumnDef::new(TeamMembers::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(TeamMembers::UpdatedAt).timestamp_with_time_zone().not_null())
                    .index(
                        Index::create()
                            .name("idx_team_members_user_team")
                            .col(TeamMembers::UserId)
                            .col(TeamMembers::TeamId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamInvitations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeamInvitations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(TeamInvitations::TeamId).string().not_null())
                    .col(ColumnDef::new(TeamInvitations::Email).string().not_null())
                    .col(ColumnDef::new(TeamInvitations::InvitedBy).string().not_null())
                    .col(ColumnDef::new(TeamInvitations::AcceptedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TeamInvitations::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::UserId).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::TeamId).string().null())
                    .col(ColumnDef::new(Notifications::Payload).string().not_null().default("{}"))
                    .col(ColumnDef::new(Notifications::StartAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Projects::TeamId).string().not_null())
                    .col(ColumnDef::new(Projects::TeamMemberId).string().not_null())
                    .col(ColumnDef::new(Projects::Content).string().not_null())
                    .col(ColumnDef::new(Projects::Status).string().not_null().default("active"))
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_team_id")
                    .table(Projects::Table)
                    .col(Projects::TeamId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamInvitations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PreferredName,
    PasswordHash,
    Tms,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganizationUsers {
    Table,
    Id,
    OrgId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    OrgId,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMembers {
    Table,
    Id,
    TeamId,
    UserId,
    PreferredName,
    Email,
    IsLead,
    IsNotRemoved,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamInvitations {
    Table,
    Id,
    TeamId,
    Email,
    InvitedBy,
    AcceptedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    TeamId,
    Payload,
    StartAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    TeamId,
    TeamMemberId,
    Content,
    Status,
    CreatedAt,
    UpdatedAt,
}
