use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, TransactionCmd, TransactionKind};

use super::super::Engine;

impl Engine {
    /// Move money between two profiles of the same user.
    ///
    /// Books an expense in the source profile and an income in the
    /// destination profile, both under the system "Profile transfer"
    /// categories. The income lands on `destination_institution_id` when
    /// given, otherwise on the source institution. Returns the outgoing leg.
    pub(super) async fn create_profile_transfer(
        &self,
        db: &DatabaseTransaction,
        cmd: &TransactionCmd,
        description: &str,
        user_id: Uuid,
    ) -> ResultEngine<Transaction> {
        if cmd.kind != TransactionKind::Expense {
            return Err(EngineError::InvalidInput(
                "profile transfers must be booked as expenses".to_string(),
            ));
        }
        let Some(destination_id) = cmd.destination_profile_id else {
            return Err(EngineError::InvalidInput(
                "destination_profile_id is required".to_string(),
            ));
        };

        let institution = self
            .require_institution(db, cmd.institution_id, user_id)
            .await?;
        let source = match cmd.profile_id {
            Some(id) => self.require_profile(db, id, user_id).await?,
            None => self.require_profile(db, institution.profile_id, user_id).await?,
        };
        if institution.profile_id != source.id {
            return Err(EngineError::InvalidInput(
                "institution does not belong to the profile".to_string(),
            ));
        }
        if destination_id == source.id {
            return Err(EngineError::InvalidInput(
                "source and destination profiles must differ".to_string(),
            ));
        }
        let destination = self.require_profile(db, destination_id, user_id).await?;

        let credit_institution_id = match cmd.destination_institution_id {
            Some(id) => {
                let credited = self.require_institution(db, id, user_id).await?;
                if credited.profile_id != destination.id {
                    return Err(EngineError::InvalidInput(
                        "destination institution does not belong to the destination profile"
                            .to_string(),
                    ));
                }
                credited.id
            }
            None => institution.id,
        };

        let out_category = self
            .profile_transfer_category(db, source.id, TransactionKind::Expense)
            .await?;
        let in_category = self
            .profile_transfer_category(db, destination.id, TransactionKind::Income)
            .await?;

        let mut outgoing = Transaction::new(
            user_id,
            source.id,
            institution.id,
            (out_category.id, out_category.name.as_str()),
            None,
            cmd.occurred_on,
            format!("{description} (to {})", destination.name),
            cmd.amount_minor,
            TransactionKind::Expense,
        )?;
        let mut incoming = Transaction::new(
            user_id,
            destination.id,
            credit_institution_id,
            (in_category.id, in_category.name.as_str()),
            None,
            cmd.occurred_on,
            format!("{description} (from {})", source.name),
            cmd.amount_minor,
            TransactionKind::Income,
        )?;
        let (outgoing_id, incoming_id) = (outgoing.id, incoming.id);
        for (leg, other) in [(&mut outgoing, incoming_id), (&mut incoming, outgoing_id)] {
            leg.is_profile_transfer = true;
            leg.destination_profile_id = Some(destination.id);
            leg.related_transaction_id = Some(other);
        }

        self.insert_transaction(db, &outgoing).await?;
        self.insert_transaction(db, &incoming).await?;
        tracing::info!(
            source = %source.id,
            destination = %destination.id,
            amount_minor = cmd.amount_minor,
            "profile transfer booked"
        );
        Ok(outgoing)
    }
}
