use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    CreateUserCmd, EngineError, Profile, ProfileKind, RegisterUserCmd, ResultEngine,
    UpdateAccountCmd, User, UserRole,
    password::{hash_password, validate_new_password, verify_password},
    profiles, users,
    util::normalize_email,
};

use super::{Engine, normalize_required_name, with_tx};

/// Name of the profile every new account starts with.
const DEFAULT_PROFILE_NAME: &str = "Personal";

impl Engine {
    /// Self-service sign up. The new user is always `common` and gets a
    /// personal profile.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        validate_new_password(&cmd.password, Some(&cmd.password_confirmation))?;
        with_tx!(self, |db_tx| {
            self.insert_user(&db_tx, &cmd.name, &cmd.email, &cmd.password, UserRole::Common)
                .await
        })
    }

    /// Create a user with any role.
    ///
    /// Authorization: requires `admin`.
    pub async fn create_user(&self, cmd: CreateUserCmd, actor_id: Uuid) -> ResultEngine<User> {
        validate_new_password(&cmd.password, None)?;
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            self.insert_user(&db_tx, &cmd.name, &cmd.email, &cmd.password, cmd.role)
                .await
        })
    }

    /// Create a user without an acting admin. Meant for trusted callers such
    /// as the operator CLI bootstrapping the first admin.
    pub async fn provision_user(&self, cmd: CreateUserCmd) -> ResultEngine<User> {
        validate_new_password(&cmd.password, None)?;
        with_tx!(self, |db_tx| {
            self.insert_user(&db_tx, &cmd.name, &cmd.email, &cmd.password, cmd.role)
                .await
        })
    }

    /// Check credentials. Unknown emails and wrong passwords fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let invalid = || EngineError::Unauthorized("invalid credentials".to_string());
        let email = normalize_email(email).map_err(|_| invalid())?;

        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?;
        let Some(model) = model else {
            tracing::warn!("login attempt for unknown email {email}");
            return Err(invalid());
        };
        if !verify_password(password, &model.password_hash) {
            tracing::warn!("wrong password for {email}");
            return Err(invalid());
        }
        User::try_from(model)
    }

    /// Return the user with `user_id`.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            User::try_from(self.require_user(&db_tx, user_id).await?)
        })
    }

    pub async fn is_admin(&self, user_id: Uuid) -> ResultEngine<bool> {
        let user = self.user(user_id).await?;
        Ok(user.role == UserRole::Admin)
    }

    /// Change the caller's own name, email and/or password.
    ///
    /// The current password must match. At least one field must actually
    /// change.
    pub async fn update_account(&self, cmd: UpdateAccountCmd, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            if !verify_password(&cmd.current_password, &model.password_hash) {
                return Err(EngineError::Unauthorized(
                    "current password is wrong".to_string(),
                ));
            }

            let mut active: users::ActiveModel = model.clone().into();
            let mut changed = false;

            if let Some(name) = cmd.name.as_deref() {
                let name = normalize_required_name(name, "user")?;
                if name != model.name {
                    active.name = ActiveValue::Set(name);
                    changed = true;
                }
            }
            if let Some(email) = cmd.email.as_deref() {
                let email = normalize_email(email)?;
                if email != model.email {
                    self.ensure_email_free(&db_tx, &email, Some(user_id)).await?;
                    active.email = ActiveValue::Set(email);
                    changed = true;
                }
            }
            if let Some(new_password) = cmd.new_password.as_deref() {
                let confirmation = cmd.new_password_confirmation.as_deref().unwrap_or_default();
                validate_new_password(new_password, Some(confirmation))?;
                active.password_hash = ActiveValue::Set(hash_password(new_password)?);
                changed = true;
            }

            if !changed {
                return Err(EngineError::InvalidInput("no changes".to_string()));
            }
            User::try_from(active.update(&db_tx).await?)
        })
    }

    /// Authorization: requires `admin`.
    pub async fn list_users(&self, actor_id: Uuid) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            users::Entity::find()
                .order_by_asc(users::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Authorization: requires `admin`.
    pub async fn admin_user(&self, user_id: Uuid, actor_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            User::try_from(self.require_user(&db_tx, user_id).await?)
        })
    }

    /// Rename a user or change its email.
    ///
    /// Authorization: requires `admin`.
    pub async fn admin_update_user(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        actor_id: Uuid,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            let model = self.require_user(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.clone().into();

            if let Some(name) = name {
                active.name = ActiveValue::Set(normalize_required_name(name, "user")?);
            }
            if let Some(email) = email {
                let email = normalize_email(email)?;
                if email != model.email {
                    self.ensure_email_free(&db_tx, &email, Some(user_id)).await?;
                }
                active.email = ActiveValue::Set(email);
            }
            User::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete a user and everything it owns.
    ///
    /// Authorization: requires `admin`; admins cannot delete themselves.
    pub async fn delete_user(&self, user_id: Uuid, actor_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            if user_id == actor_id {
                return Err(EngineError::Forbidden(
                    "cannot delete your own account".to_string(),
                ));
            }
            self.require_user(&db_tx, user_id).await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Backs promote/demote/lawyer.
    ///
    /// Authorization: requires `admin`; admins cannot drop their own admin role.
    pub async fn set_user_role(
        &self,
        user_id: Uuid,
        role: UserRole,
        actor_id: Uuid,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, actor_id).await?;
            if user_id == actor_id && role != UserRole::Admin {
                return Err(EngineError::Forbidden(
                    "cannot remove your own admin role".to_string(),
                ));
            }
            self.write_role(&db_tx, user_id, role).await
        })
    }

    /// Change a role by email without an acting admin (operator CLI).
    pub async fn provision_role(&self, email: &str, role: UserRole) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            self.write_role(&db_tx, model.id, role).await
        })
    }

    async fn write_role(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        role: UserRole,
    ) -> ResultEngine<User> {
        let model = self.require_user(db, user_id).await?;
        let mut active: users::ActiveModel = model.into();
        active.role = ActiveValue::Set(role.as_str().to_string());
        User::try_from(active.update(db).await?)
    }

    async fn ensure_email_free(
        &self,
        db: &DatabaseTransaction,
        email: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(email.to_string()));
        }
        Ok(())
    }

    async fn insert_user(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        let email = normalize_email(email)?;
        self.ensure_email_free(db, &email, None).await?;

        let model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(hash_password(password)?),
            role: ActiveValue::Set(role.as_str().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;

        let profile = Profile::new(model.id, DEFAULT_PROFILE_NAME.to_string(), ProfileKind::Pf);
        profiles::ActiveModel::from(&profile).insert(db).await?;

        tracing::info!("created {} user {}", role.as_str(), model.email);
        User::try_from(model)
    }
}
