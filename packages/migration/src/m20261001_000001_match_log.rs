use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Matches {
    Table,
    Id,
    Mode,
    Status,
    Stage,
    Seed,
    Rules,
    HostUserId,
    LastSeq,
    Degraded,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MatchPlayers {
    Table,
    Id,
    MatchId,
    Seat,
    UserId,
    DisplayName,
    IsBot,
    IsConnected,
    Stack,
    InitialStack,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum StageStates {
    Table,
    Id,
    MatchId,
    Stage,
    StateJson,
    StartedAt,
    ClosedAt,
}

#[derive(Iden)]
enum MatchEvents {
    Table,
    Id,
    MatchId,
    Seq,
    EventType,
    Payload,
    ServerTs,
    ClientTs,
}

#[derive(Iden)]
enum MatchSnapshots {
    Table,
    Id,
    MatchId,
    Seq,
    StateJson,
    Checksum,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    MatchId,
    Seq,
    Seat,
    UserId,
    Stage,
    Delta,
    Reason,
    CreatedAt,
}

fn id_col<T: Iden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

fn match_fk<T: Iden + 'static>(name: &str, table: T, col: T) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Matches::Table, Matches::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(id_col(Matches::Id))
                    .col(ColumnDef::new(Matches::Mode).string_len(32).not_null())
                    .col(ColumnDef::new(Matches::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Matches::Stage).string_len(32).not_null())
                    .col(ColumnDef::new(Matches::Seed).big_integer().not_null())
                    .col(ColumnDef::new(Matches::Rules).json().not_null())
                    .col(ColumnDef::new(Matches::HostUserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Matches::LastSeq)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Matches::Degraded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MatchPlayers::Table)
                    .if_not_exists()
                    .col(id_col(MatchPlayers::Id))
                    .col(ColumnDef::new(MatchPlayers::MatchId).big_integer().not_null())
                    .col(ColumnDef::new(MatchPlayers::Seat).small_integer().not_null())
                    .col(ColumnDef::new(MatchPlayers::UserId).big_integer().null())
                    .col(ColumnDef::new(MatchPlayers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(MatchPlayers::IsBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MatchPlayers::IsConnected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MatchPlayers::Stack).big_integer().not_null())
                    .col(
                        ColumnDef::new(MatchPlayers::InitialStack)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchPlayers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchPlayers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut match_fk(
                        "fk_match_players_match_id",
                        MatchPlayers::Table,
                        MatchPlayers::MatchId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_match_players_match_seat")
                    .table(MatchPlayers::Table)
                    .col(MatchPlayers::MatchId)
                    .col(MatchPlayers::Seat)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StageStates::Table)
                    .if_not_exists()
                    .col(id_col(StageStates::Id))
                    .col(ColumnDef::new(StageStates::MatchId).big_integer().not_null())
                    .col(ColumnDef::new(StageStates::Stage).string_len(32).not_null())
                    .col(ColumnDef::new(StageStates::StateJson).json().not_null())
                    .col(
                        ColumnDef::new(StageStates::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StageStates::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(&mut match_fk(
                        "fk_stage_states_match_id",
                        StageStates::Table,
                        StageStates::MatchId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_stage_states_match_stage")
                    .table(StageStates::Table)
                    .col(StageStates::MatchId)
                    .col(StageStates::Stage)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MatchEvents::Table)
                    .if_not_exists()
                    .col(id_col(MatchEvents::Id))
                    .col(ColumnDef::new(MatchEvents::MatchId).big_integer().not_null())
                    .col(ColumnDef::new(MatchEvents::Seq).big_integer().not_null())
                    .col(ColumnDef::new(MatchEvents::EventType).string_len(64).not_null())
                    .col(ColumnDef::new(MatchEvents::Payload).json().not_null())
                    .col(ColumnDef::new(MatchEvents::ServerTs).big_integer().not_null())
                    .col(ColumnDef::new(MatchEvents::ClientTs).big_integer().null())
                    .foreign_key(&mut match_fk(
                        "fk_match_events_match_id",
                        MatchEvents::Table,
                        MatchEvents::MatchId,
                    ))
                    .to_owned(),
            )
            .await?;

        // Single-writer guard: a second writer for the same seq fails here.
        manager
            .create_index(
                Index::create()
                    .name("ux_match_events_match_seq")
                    .table(MatchEvents::Table)
                    .col(MatchEvents::MatchId)
                    .col(MatchEvents::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MatchSnapshots::Table)
                    .if_not_exists()
                    .col(id_col(MatchSnapshots::Id))
                    .col(ColumnDef::new(MatchSnapshots::MatchId).big_integer().not_null())
                    .col(ColumnDef::new(MatchSnapshots::Seq).big_integer().not_null())
                    .col(ColumnDef::new(MatchSnapshots::StateJson).json().not_null())
                    .col(ColumnDef::new(MatchSnapshots::Checksum).string_len(64).not_null())
                    .col(
                        ColumnDef::new(MatchSnapshots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut match_fk(
                        "fk_match_snapshots_match_id",
                        MatchSnapshots::Table,
                        MatchSnapshots::MatchId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_match_snapshots_match_seq")
                    .table(MatchSnapshots::Table)
                    .col(MatchSnapshots::MatchId)
                    .col(MatchSnapshots::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(id_col(LedgerEntries::Id))
                    .col(ColumnDef::new(LedgerEntries::MatchId).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Seq).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Seat).small_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::UserId).big_integer().null())
                    .col(ColumnDef::new(LedgerEntries::Stage).string_len(32).not_null())
                    .col(ColumnDef::new(LedgerEntries::Delta).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Reason).string_len(32).not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut match_fk(
                        "fk_ledger_entries_match_id",
                        LedgerEntries::Table,
                        LedgerEntries::MatchId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_ledger_entries_match_seat")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::MatchId)
                    .col(LedgerEntries::Seat)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchSnapshots::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchEvents::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StageStates::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchPlayers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
