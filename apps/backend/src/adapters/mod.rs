//! Database adapters. Each returns `sea_orm::DbErr`; callers translate.

pub mod documents_sea;
