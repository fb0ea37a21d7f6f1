mod common;

use common::{books, books_in, day, engine_with_db, register};
use engine::{
    Classification, EngineError, InstallmentsCmd, InstitutionCmd, MAX_AMOUNT_MINOR, ProfileKind,
    SummaryQuery, TransactionCmd, TransactionKind, TransactionListFilter,
};

#[tokio::test]
async fn income_and_expense_move_the_balance() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let salary = engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Income,
                b.bank.id,
                2_500_00,
                day(2025, 3, 5),
                "March salary",
            )
            .category(b.salary.id),
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(salary.profile_id, b.profile.id);
    assert_eq!(salary.category_name, "Salary");
    assert_eq!(salary.classification, Classification::HighValue);

    engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Expense,
                b.bank.id,
                45_90,
                day(2025, 3, 6),
                "Market",
            )
            .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap();

    let bank = engine.institution(b.bank.id, ana.id).await.unwrap();
    assert_eq!(bank.balance_minor, 100_00 + 2_500_00 - 45_90);

    let listed = engine
        .list_transactions(&TransactionListFilter::default(), ana.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].description, "Market");
}

#[tokio::test]
async fn invalid_transactions_are_rejected() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let zero = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 0, day(2025, 1, 1), "x")
                .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(zero, EngineError::InvalidAmount(_)));

    let future = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 10_00, day(2999, 1, 1), "x")
                .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(future, EngineError::InvalidInput(_)));

    let wrong_kind = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 10_00, day(2025, 1, 1), "x")
                .category(b.salary.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(wrong_kind, EngineError::InvalidInput(_)));

    let bob = register(&engine, "Bob", "bob@example.com").await;
    let foreign = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 10_00, day(2025, 1, 1), "x")
                .category(b.groceries.id),
            bob.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(foreign, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_and_delete_revert_previous_effect() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let tx = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 30_00, day(2025, 2, 1), "Fuel")
                .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap();

    let updated = engine
        .update_transaction(
            tx.id,
            TransactionCmd::new(TransactionKind::Income, b.bank.id, 20_00, day(2025, 2, 2), "Refund")
                .category(b.salary.id),
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.kind, TransactionKind::Income);
    assert_eq!(updated.category_name, "Salary");
    let bank = engine.institution(b.bank.id, ana.id).await.unwrap();
    assert_eq!(bank.balance_minor, 120_00);

    engine.delete_transaction(tx.id, ana.id).await.unwrap();
    let bank = engine.institution(b.bank.id, ana.id).await.unwrap();
    assert_eq!(bank.balance_minor, 100_00);
}

#[tokio::test]
async fn profile_transfer_books_both_legs_and_deletes_them_together() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let personal = books(&engine, &ana).await;
    let office_profile = engine
        .create_profile("Office", ProfileKind::Pj, ana.id)
        .await
        .unwrap();
    let office = books_in(&engine, &ana, office_profile).await;

    let outgoing = engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Expense,
                personal.bank.id,
                40_00,
                day(2025, 4, 1),
                "Capital",
            )
            .transfer_to(office.profile.id, Some(office.bank.id)),
            ana.id,
        )
        .await
        .unwrap();
    assert!(outgoing.is_profile_transfer);
    assert_eq!(outgoing.category_name, "Profile transfer");
    let incoming_id = outgoing.related_transaction_id.unwrap();
    let incoming = engine.transaction(incoming_id, ana.id).await.unwrap();
    assert_eq!(incoming.kind, TransactionKind::Income);
    assert_eq!(incoming.profile_id, office.profile.id);

    assert_eq!(
        engine.institution(personal.bank.id, ana.id).await.unwrap().balance_minor,
        60_00
    );
    assert_eq!(
        engine.institution(office.bank.id, ana.id).await.unwrap().balance_minor,
        140_00
    );

    let edit = engine
        .update_transaction(
            outgoing.id,
            TransactionCmd::new(TransactionKind::Expense, personal.bank.id, 1_00, day(2025, 4, 1), "x")
                .category(personal.groceries.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(edit, EngineError::InvalidInput(_)));

    engine.delete_transaction(incoming_id, ana.id).await.unwrap();
    assert_eq!(
        engine.institution(personal.bank.id, ana.id).await.unwrap().balance_minor,
        100_00
    );
    assert_eq!(
        engine.institution(office.bank.id, ana.id).await.unwrap().balance_minor,
        100_00
    );
    assert!(
        engine
            .list_transactions(&TransactionListFilter::default(), ana.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn transfer_to_same_profile_is_rejected() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let err = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 5_00, day(2025, 4, 1), "Loop")
                .transfer_to(b.profile.id, None),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn transfer_without_destination_institution_stays_on_the_source() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let personal = books(&engine, &ana).await;
    let office = engine
        .create_profile("Office", ProfileKind::Pj, ana.id)
        .await
        .unwrap();

    let outgoing = engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Expense,
                personal.bank.id,
                30_00,
                day(2025, 4, 2),
                "Rent share",
            )
            .transfer_to(office.id, None),
            ana.id,
        )
        .await
        .unwrap();
    let incoming = engine
        .transaction(outgoing.related_transaction_id.unwrap(), ana.id)
        .await
        .unwrap();

    assert_eq!(outgoing.description, "Rent share (to Office)");
    assert_eq!(incoming.description, "Rent share (from Personal)");
    assert_eq!(incoming.institution_id, personal.bank.id);
    assert_eq!(incoming.profile_id, office.id);
    assert_eq!(incoming.related_transaction_id, Some(outgoing.id));
    assert_eq!(
        engine.institution(personal.bank.id, ana.id).await.unwrap().balance_minor,
        100_00
    );
}

#[tokio::test]
async fn transfer_must_be_an_expense() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;
    let office = engine
        .create_profile("Office", ProfileKind::Pj, ana.id)
        .await
        .unwrap();

    let err = engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Income, b.bank.id, 5_00, day(2025, 4, 1), "Back")
                .transfer_to(office.id, None),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert!(
        engine
            .list_transactions(&TransactionListFilter::default(), ana.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn amounts_above_the_limit_are_rejected() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let too_big = engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Income,
                b.bank.id,
                MAX_AMOUNT_MINOR + 1,
                day(2025, 1, 1),
                "Jackpot",
            )
            .category(b.salary.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(too_big, EngineError::InvalidAmount(_)));

    let huge = engine
        .create_transaction(
            TransactionCmd::new(
                TransactionKind::Income,
                b.bank.id,
                i64::MAX / 2 + 1,
                day(2025, 1, 1),
                "Jackpot",
            )
            .category(b.salary.id),
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(huge, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn summary_adds_amounts_at_the_limit() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;
    let savings = engine
        .create_institution(
            b.profile.id,
            InstitutionCmd {
                name: "Savings".to_string(),
                kind: "savings".to_string(),
                opening_balance_minor: 0,
            },
            ana.id,
        )
        .await
        .unwrap();

    for institution_id in [b.bank.id, savings.id] {
        engine
            .create_transaction(
                TransactionCmd::new(
                    TransactionKind::Income,
                    institution_id,
                    MAX_AMOUNT_MINOR,
                    day(2025, 7, 1),
                    "Sale",
                )
                .category(b.salary.id),
                ana.id,
            )
            .await
            .unwrap();
    }

    let summary = engine
        .financial_summary(
            &SummaryQuery {
                profile_id: None,
                from: day(2025, 7, 1),
                to: day(2025, 7, 31),
            },
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(summary.total_income, 2 * MAX_AMOUNT_MINOR);
    assert_eq!(summary.balance, 2 * MAX_AMOUNT_MINOR);
    assert_eq!(summary.by_category[0].total, 2 * MAX_AMOUNT_MINOR);

    let refreshed = engine
        .recompute_balances(Some(b.profile.id), ana.id)
        .await
        .unwrap();
    assert!(
        refreshed
            .iter()
            .any(|i| i.balance_minor == MAX_AMOUNT_MINOR + 100_00)
    );
}

#[tokio::test]
async fn installments_split_amount_and_dates() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    let rows = engine
        .create_installments(
            InstallmentsCmd {
                transaction: TransactionCmd::new(
                    TransactionKind::Expense,
                    b.bank.id,
                    100_00,
                    day(2025, 1, 31),
                    "Laptop",
                )
                .category(b.groceries.id),
                installment_count: 3,
            },
            ana.id,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    let amounts: Vec<i64> = rows.iter().map(|r| r.amount_minor).collect();
    assert_eq!(amounts, vec![33_34, 33_33, 33_33]);
    assert_eq!(rows[0].occurred_on, day(2025, 1, 31));
    assert_eq!(rows[1].occurred_on, day(2025, 2, 28));
    assert_eq!(rows[2].occurred_on, day(2025, 3, 31));
    assert_eq!(rows[2].description, "Laptop (3/3)");
    let group = rows[0].installment.unwrap().group;
    assert!(rows.iter().all(|r| r.installment.unwrap().group == group));

    assert_eq!(
        engine.institution(b.bank.id, ana.id).await.unwrap().balance_minor,
        0
    );

    let removed = engine.delete_installment_group(group, ana.id).await.unwrap();
    assert_eq!(removed, 3);
    assert_eq!(
        engine.institution(b.bank.id, ana.id).await.unwrap().balance_minor,
        100_00
    );
}

#[tokio::test]
async fn installment_count_is_bounded() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    for count in [1, 121] {
        let err = engine
            .create_installments(
                InstallmentsCmd {
                    transaction: TransactionCmd::new(
                        TransactionKind::Expense,
                        b.bank.id,
                        100_00,
                        day(2025, 1, 1),
                        "Phone",
                    )
                    .category(b.groceries.id),
                    installment_count: count,
                },
                ana.id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn summary_totals_by_category() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    for (kind, category, amount, date) in [
        (TransactionKind::Income, b.salary.id, 900_00, day(2025, 5, 1)),
        (TransactionKind::Expense, b.groceries.id, 120_00, day(2025, 5, 2)),
        (TransactionKind::Expense, b.groceries.id, 30_00, day(2025, 5, 20)),
        (TransactionKind::Expense, b.groceries.id, 10_00, day(2025, 6, 1)),
    ] {
        engine
            .create_transaction(
                TransactionCmd::new(kind, b.bank.id, amount, date, "entry").category(category),
                ana.id,
            )
            .await
            .unwrap();
    }

    let summary = engine
        .financial_summary(
            &SummaryQuery {
                profile_id: Some(b.profile.id),
                from: day(2025, 5, 1),
                to: day(2025, 5, 31),
            },
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(summary.total_income, 900_00);
    assert_eq!(summary.total_expense, 150_00);
    assert_eq!(summary.balance, 750_00);
    assert_eq!(summary.by_category.len(), 2);
    assert_eq!(summary.by_category[0].name, "Salary");

    let bad_range = engine
        .financial_summary(
            &SummaryQuery {
                profile_id: None,
                from: day(2025, 6, 1),
                to: day(2025, 5, 1),
            },
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(bad_range, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn recompute_balances_repairs_drift() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 25_00, day(2025, 2, 1), "Gas")
                .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap();

    let refreshed = engine
        .recompute_balances(Some(b.profile.id), ana.id)
        .await
        .unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].balance_minor, 75_00);
}

#[tokio::test]
async fn deleting_a_used_category_or_institution_fails() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let b = books(&engine, &ana).await;

    engine
        .create_transaction(
            TransactionCmd::new(TransactionKind::Expense, b.bank.id, 5_00, day(2025, 2, 1), "Bread")
                .category(b.groceries.id),
            ana.id,
        )
        .await
        .unwrap();

    let category = engine.delete_category(b.groceries.id, ana.id).await.unwrap_err();
    assert!(matches!(category, EngineError::InUse(_)));
    let institution = engine.delete_institution(b.bank.id, ana.id).await.unwrap_err();
    assert!(matches!(institution, EngineError::InUse(_)));
}
