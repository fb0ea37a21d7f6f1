use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Client, ClientCmd, EngineError, ResultEngine, cases, clients,
    util::{bounded_text, normalize_email},
};

use super::{Engine, normalize_optional_text, with_tx};

/// Filters for listing clients. Unset fields do not filter.
#[derive(Clone, Debug, Default)]
pub struct ClientListFilter {
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Client fields after trimming and validation.
struct ClientFields {
    name: String,
    tax_id: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    notes: Option<String>,
}

fn client_fields(cmd: &ClientCmd) -> ResultEngine<ClientFields> {
    let email = match normalize_optional_text(cmd.email.as_deref()) {
        Some(email) => Some(normalize_email(&email)?),
        None => None,
    };
    let state = normalize_optional_text(cmd.state.as_deref()).map(|s| s.to_uppercase());
    if let Some(state) = &state
        && state.chars().count() > 2
    {
        return Err(EngineError::InvalidInput(
            "state must have at most 2 characters".to_string(),
        ));
    }
    Ok(ClientFields {
        name: bounded_text(&cmd.name, "client name", 2, 100)?,
        tax_id: bounded_text(&cmd.tax_id, "tax id", 11, 18)?,
        phone: normalize_optional_text(cmd.phone.as_deref()),
        email,
        address: normalize_optional_text(cmd.address.as_deref()),
        city: normalize_optional_text(cmd.city.as_deref()),
        state,
        postal_code: normalize_optional_text(cmd.postal_code.as_deref()),
        notes: normalize_optional_text(cmd.notes.as_deref()),
    })
}

impl Engine {
    /// Register a client for the calling lawyer.
    pub async fn create_client(&self, cmd: ClientCmd, lawyer_id: Uuid) -> ResultEngine<Client> {
        let fields = client_fields(&cmd)?;
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            self.ensure_tax_id_free(&db_tx, lawyer_id, &fields.tax_id, None)
                .await?;

            let now = Utc::now();
            let client = Client {
                id: Uuid::new_v4(),
                lawyer_id,
                name: fields.name,
                tax_id: fields.tax_id,
                phone: fields.phone,
                email: fields.email,
                address: fields.address,
                city: fields.city,
                state: fields.state,
                postal_code: fields.postal_code,
                notes: fields.notes,
                created_at: now,
                updated_at: now,
                total_cases: 0,
            };
            clients::ActiveModel::from(&client).insert(&db_tx).await?;
            Ok(client)
        })
    }

    pub async fn client(&self, client_id: Uuid, lawyer_id: Uuid) -> ResultEngine<Client> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let model = self.require_client(&db_tx, client_id, lawyer_id).await?;
            let total = cases::Entity::find()
                .filter(cases::Column::ClientId.eq(model.id))
                .count(&db_tx)
                .await?;
            Ok(Client::from((model, total)))
        })
    }

    /// List the lawyer's clients ordered by name.
    pub async fn list_clients(
        &self,
        filter: &ClientListFilter,
        lawyer_id: Uuid,
    ) -> ResultEngine<Vec<Client>> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let mut query =
                clients::Entity::find().filter(clients::Column::LawyerId.eq(lawyer_id));
            if let Some(city) = normalize_optional_text(filter.city.as_deref()) {
                query = query.filter(clients::Column::City.eq(city));
            }
            if let Some(state) = normalize_optional_text(filter.state.as_deref()) {
                query = query.filter(clients::Column::State.eq(state.to_uppercase()));
            }
            let models = query
                .order_by_asc(clients::Column::Name)
                .all(&db_tx)
                .await?;
            self.client_views(&db_tx, models, lawyer_id).await
        })
    }

    /// Clients whose name, tax id or email contains `term`, ignoring case.
    pub async fn search_clients(&self, term: &str, lawyer_id: Uuid) -> ResultEngine<Vec<Client>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(EngineError::InvalidInput(
                "search term must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let models = clients::Entity::find()
                .filter(clients::Column::LawyerId.eq(lawyer_id))
                .filter(
                    Condition::any()
                        .add(clients::Column::Name.contains(term))
                        .add(clients::Column::TaxId.contains(term))
                        .add(clients::Column::Email.contains(term.to_lowercase())),
                )
                .order_by_asc(clients::Column::Name)
                .all(&db_tx)
                .await?;
            self.client_views(&db_tx, models, lawyer_id).await
        })
    }

    pub async fn count_clients(&self, lawyer_id: Uuid) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            Ok(clients::Entity::find()
                .filter(clients::Column::LawyerId.eq(lawyer_id))
                .count(&db_tx)
                .await?)
        })
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        cmd: ClientCmd,
        lawyer_id: Uuid,
    ) -> ResultEngine<Client> {
        let fields = client_fields(&cmd)?;
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let model = self.require_client(&db_tx, client_id, lawyer_id).await?;
            self.ensure_tax_id_free(&db_tx, lawyer_id, &fields.tax_id, Some(model.id))
                .await?;

            let active = clients::ActiveModel {
                id: ActiveValue::Set(model.id),
                name: ActiveValue::Set(fields.name),
                tax_id: ActiveValue::Set(fields.tax_id),
                phone: ActiveValue::Set(fields.phone),
                email: ActiveValue::Set(fields.email),
                address: ActiveValue::Set(fields.address),
                city: ActiveValue::Set(fields.city),
                state: ActiveValue::Set(fields.state),
                postal_code: ActiveValue::Set(fields.postal_code),
                notes: ActiveValue::Set(fields.notes),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            let total = cases::Entity::find()
                .filter(cases::Column::ClientId.eq(model.id))
                .count(&db_tx)
                .await?;
            Ok(Client::from((model, total)))
        })
    }

    /// Delete a client. Fails with `InUse` while cases reference it.
    pub async fn delete_client(&self, client_id: Uuid, lawyer_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            self.require_client(&db_tx, client_id, lawyer_id).await?;
            let total = cases::Entity::find()
                .filter(cases::Column::ClientId.eq(client_id))
                .count(&db_tx)
                .await?;
            if total > 0 {
                return Err(EngineError::InUse(format!("client ({total} cases)")));
            }
            clients::Entity::delete_by_id(client_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_tax_id_free(
        &self,
        db: &DatabaseTransaction,
        lawyer_id: Uuid,
        tax_id: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = clients::Entity::find()
            .filter(clients::Column::LawyerId.eq(lawyer_id))
            .filter(clients::Column::TaxId.eq(tax_id));
        if let Some(id) = except {
            query = query.filter(clients::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(tax_id.to_string()));
        }
        Ok(())
    }

    async fn client_views(
        &self,
        db: &DatabaseTransaction,
        models: Vec<clients::Model>,
        lawyer_id: Uuid,
    ) -> ResultEngine<Vec<Client>> {
        let counts: HashMap<Uuid, i64> = cases::Entity::find()
            .filter(cases::Column::LawyerId.eq(lawyer_id))
            .select_only()
            .column(cases::Column::ClientId)
            .column_as(Expr::col(cases::Column::Id).count(), "total")
            .group_by(cases::Column::ClientId)
            .into_tuple::<(Uuid, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        Ok(models
            .into_iter()
            .map(|model| {
                let total = counts.get(&model.id).copied().unwrap_or_default();
                Client::from((model, u64::try_from(total).unwrap_or_default()))
            })
            .collect())
    }
}
