use sea_orm::{DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, UserRole, cases, categories, clients, institutions, profiles,
    subcategories, transactions, users,
};

use super::Engine;

/// Generates a lookup that only returns a row when it belongs to one of the
/// caller's profiles.
macro_rules! impl_require_in_profile {
    ($fn_name:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .inner_join(profiles::Entity)
                .filter(profiles::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_in_profile!(
        require_institution,
        institutions::Entity,
        institutions::Model,
        "institution not exists"
    );

    impl_require_in_profile!(
        require_category,
        categories::Entity,
        categories::Model,
        "category not exists"
    );

    impl_require_in_profile!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        "transaction not exists"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Load the caller and check it holds `admin`.
    pub(super) async fn require_admin(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if UserRole::try_from(user.role.as_str())? != UserRole::Admin {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(user)
    }

    /// Load the caller and check it may manage clients and cases.
    pub(super) async fn require_lawyer(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if !UserRole::try_from(user.role.as_str())?.can_practice_law() {
            return Err(EngineError::Forbidden("lawyer role required".to_string()));
        }
        Ok(user)
    }

    pub(super) async fn require_profile(
        &self,
        db: &DatabaseTransaction,
        profile_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<profiles::Model> {
        profiles::Entity::find_by_id(profile_id)
            .filter(profiles::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("profile not exists".to_string()))
    }

    pub(super) async fn require_subcategory(
        &self,
        db: &DatabaseTransaction,
        subcategory_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<(subcategories::Model, categories::Model)> {
        let not_found = || EngineError::KeyNotFound("subcategory not exists".to_string());
        let subcategory = subcategories::Entity::find_by_id(subcategory_id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        let category = self
            .require_category(db, subcategory.category_id, user_id)
            .await
            .map_err(|err| match err {
                EngineError::KeyNotFound(_) => not_found(),
                other => other,
            })?;
        Ok((subcategory, category))
    }

    pub(super) async fn require_client(
        &self,
        db: &DatabaseTransaction,
        client_id: Uuid,
        lawyer_id: Uuid,
    ) -> ResultEngine<clients::Model> {
        clients::Entity::find_by_id(client_id)
            .filter(clients::Column::LawyerId.eq(lawyer_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("client not exists".to_string()))
    }

    pub(super) async fn require_case(
        &self,
        db: &DatabaseTransaction,
        case_id: Uuid,
        lawyer_id: Uuid,
    ) -> ResultEngine<cases::Model> {
        cases::Entity::find_by_id(case_id)
            .filter(cases::Column::LawyerId.eq(lawyer_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("case not exists".to_string()))
    }
}
