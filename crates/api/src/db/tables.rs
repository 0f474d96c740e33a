//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    PasswordHash,
    PasswordSalt,
    CreatedAt,
}

#[derive(Iden)]
pub enum RefreshTokens {
    Table,
    Id,
    UserId,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum Stores {
    Table,
    Id,
    Name,
    Address,
    JoinCode,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
pub enum StoreManagers {
    Table,
    StoreId,
    UserId,
    Status,
    IsPrimary,
    RequestedAt,
    DecidedAt,
    DecidedBy,
}

#[derive(Iden)]
pub enum StoreEmployees {
    Table,
    StoreId,
    UserId,
    Status,
    JoinedAt,
}

#[derive(Iden)]
pub enum Schedules {
    Table,
    Id,
    StoreId,
    WeekStart,
    Published,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
pub enum Shifts {
    Table,
    Id,
    ScheduleId,
    UserId,
    ShiftDate,
    StartTime,
    EndTime,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Availability {
    Table,
    UserId,
    AvailDate,
    Status,
    StartTime,
    EndTime,
    UpdatedAt,
}
