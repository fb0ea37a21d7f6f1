#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    Category, CreateUserCmd, Engine, Institution, InstitutionCmd, Profile, RegisterUserCmd,
    TransactionKind, User, UserRole,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub async fn register(engine: &Engine, name: &str, email: &str) -> User {
    engine
        .register_user(RegisterUserCmd {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
        })
        .await
        .unwrap()
}

pub async fn provision(engine: &Engine, name: &str, email: &str, role: UserRole) -> User {
    engine
        .provision_user(CreateUserCmd {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
        })
        .await
        .unwrap()
}

/// A profile with one bank account and an income and an expense category.
pub struct Books {
    pub profile: Profile,
    pub bank: Institution,
    pub salary: Category,
    pub groceries: Category,
}

pub async fn books(engine: &Engine, user: &User) -> Books {
    let profile = engine.list_profiles(user.id).await.unwrap().remove(0);
    books_in(engine, user, profile).await
}

pub async fn books_in(engine: &Engine, user: &User, profile: Profile) -> Books {
    let bank = engine
        .create_institution(
            profile.id,
            InstitutionCmd {
                name: "Main bank".to_string(),
                kind: "checking".to_string(),
                opening_balance_minor: 100_00,
            },
            user.id,
        )
        .await
        .unwrap();
    let salary = engine
        .create_category(profile.id, "Salary", TransactionKind::Income, user.id)
        .await
        .unwrap();
    let groceries = engine
        .create_category(profile.id, "Groceries", TransactionKind::Expense, user.id)
        .await
        .unwrap();
    Books {
        profile,
        bank,
        salary,
        groceries,
    }
}
