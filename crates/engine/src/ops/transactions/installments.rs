use chrono::Months;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, InstallmentsCmd, MoneyCents, ResultEngine, Transaction,
    transactions::{self, Installment},
};

use super::{Engine, validate_cmd, with_tx};

const MIN_INSTALLMENTS: u32 = 2;
const MAX_INSTALLMENTS: u32 = 120;

impl Engine {
    /// Split a purchase into monthly installments.
    ///
    /// The amount is divided in cents with the remainder on the first
    /// installment. Installment `i` (1-based) falls `i - 1` months after the
    /// first date, clamped to the end of shorter months. Every row hits the
    /// institution balance immediately.
    pub async fn create_installments(
        &self,
        cmd: InstallmentsCmd,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        let InstallmentsCmd {
            transaction: base,
            installment_count,
        } = cmd;
        if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&installment_count) {
            return Err(EngineError::InvalidInput(format!(
                "installment_count must be between {MIN_INSTALLMENTS} and {MAX_INSTALLMENTS}"
            )));
        }
        if base.is_transfer() {
            return Err(EngineError::InvalidInput(
                "profile transfers cannot be split into installments".to_string(),
            ));
        }
        let description = validate_cmd(&base)?;
        let shares = MoneyCents::new(base.amount_minor).split(installment_count)?;

        with_tx!(self, |db_tx| {
            let booking = self.resolve_booking(&db_tx, &base, user_id).await?;
            let group = Uuid::new_v4();

            let mut out = Vec::with_capacity(shares.len());
            for (offset, share) in (0u32..).zip(shares) {
                let number = offset + 1;
                let occurred_on = base
                    .occurred_on
                    .checked_add_months(Months::new(offset))
                    .ok_or_else(|| {
                        EngineError::InvalidInput("installment date out of range".to_string())
                    })?;
                let mut tx = Transaction::new(
                    user_id,
                    booking.profile_id,
                    booking.institution.id,
                    (booking.category.id, booking.category.name.as_str()),
                    booking.subcategory_id,
                    occurred_on,
                    format!("{description} ({number}/{installment_count})"),
                    share.cents(),
                    base.kind,
                )?;
                tx.installment = Some(Installment {
                    group,
                    number,
                    count: installment_count,
                });
                self.insert_transaction(&db_tx, &tx).await?;
                out.push(tx);
            }
            tracing::debug!(%group, count = installment_count, "installments booked");
            Ok(out)
        })
    }

    /// Delete every installment of a plan and revert their balance effects.
    /// Returns how many rows were removed.
    pub async fn delete_installment_group(&self, group: Uuid, user_id: Uuid) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let rows = transactions::Entity::find()
                .filter(transactions::Column::InstallmentGroup.eq(group))
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_asc(transactions::Column::InstallmentNumber)
                .all(&db_tx)
                .await?;
            if rows.is_empty() {
                return Err(EngineError::KeyNotFound(
                    "installment group not exists".to_string(),
                ));
            }
            let removed = rows.len() as u64;
            for row in rows {
                self.remove_transaction(&db_tx, row.id).await?;
            }
            Ok(removed)
        })
    }
}
