use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IntegrationProviders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IntegrationProviders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(IntegrationProviders::TeamId).string().not_null())
                    .col(ColumnDef::new(IntegrationProviders::UserId).string().not_null())
                    .col(ColumnDef::new(IntegrationProviders::Service).string().not_null())
                    .col(ColumnDef::new(IntegrationProviders::AccessToken).string().not_null())
                    .col(ColumnDef::new(IntegrationProviders::ProviderUserName).string().not_null())
                    .col(ColumnDef::new(IntegrationProviders::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(IntegrationProviders::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(IntegrationProviders::UpdatedAt).timestamp_with_time_zone().not_null())
                    .index(
                        Index::create()
                            .name("idx_integration_providers_team_service")
                            .col(IntegrationProviders::TeamId)
                            .col(IntegrationProviders::Service)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GithubRepos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GithubRepos::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(GithubRepos::TeamId).string().not_null())
                    .col(ColumnDef::new(GithubRepos::NameWithOwner).string().not_null())
                    .col(ColumnDef::new(GithubRepos::AdminUserId).string().not_null())
                    .col(ColumnDef::new(GithubRepos::UserIds).string().not_null().default("[]"))
                    .col(ColumnDef::new(GithubRepos::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(GithubRepos::WebhookId).big_integer().null())
                    .col(ColumnDef::new(GithubRepos::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(GithubRepos::UpdatedAt).timestamp_with_time_zone().not_null())
                    .index(
                        Index::create()
                            .name("idx_github_repos_team_name")
                            .col(GithubRepos::TeamId)
                            .col(GithubRepos::NameWithOwner)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GithubRepos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IntegrationProviders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IntegrationProviders {
    Table,
    Id,
    TeamId,
    UserId,
    Service,
    AccessToken,
    ProviderUserName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GithubRepos {
    Table,
    Id,
    TeamId,
    NameWithOwner,
    AdminUserId,
    UserIds,
    IsActive,
    WebhookId,
    CreatedAt,
    UpdatedAt,
}
