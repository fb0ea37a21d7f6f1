mod common;

use common::{day, engine_with_db, provision, register};
use engine::{
    CaseCmd, CaseListFilter, CaseStatus, ClientCmd, ClientListFilter, EngineError,
    ImportRecordCmd, ImportRecordListFilter, MAX_AMOUNT_MINOR, UserRole,
};
use uuid::Uuid;

fn client_cmd(name: &str, tax_id: &str) -> ClientCmd {
    ClientCmd {
        name: name.to_string(),
        tax_id: tax_id.to_string(),
        email: Some("Client@Example.com".to_string()),
        city: Some("Recife".to_string()),
        state: Some("pe".to_string()),
        ..Default::default()
    }
}

fn case_cmd(client_id: Uuid, process_number: &str, fee_minor: Option<i64>) -> CaseCmd {
    CaseCmd {
        client_id,
        process_number: process_number.to_string(),
        description: "Labor claim about unpaid overtime".to_string(),
        status: None,
        start_date: day(2025, 1, 10),
        end_date: None,
        fee_minor,
        fees_paid_minor: None,
        notes: None,
    }
}

#[tokio::test]
async fn only_lawyers_and_admins_manage_clients() {
    let engine = engine_with_db().await;
    let common_user = register(&engine, "Ana", "ana@example.com").await;
    let admin = provision(&engine, "Root", "root@example.com", UserRole::Admin).await;

    let err = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), common_user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let client = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), admin.id)
        .await
        .unwrap();
    assert_eq!(client.state.as_deref(), Some("PE"));
    assert_eq!(client.email.as_deref(), Some("client@example.com"));
}

#[tokio::test]
async fn client_validation_and_scoping() {
    let engine = engine_with_db().await;
    let lawyer = provision(&engine, "Dr. Lima", "lima@example.com", UserRole::Lawyer).await;
    let other = provision(&engine, "Dr. Reis", "reis@example.com", UserRole::Lawyer).await;

    let short_tax = engine
        .create_client(client_cmd("Maria Silva", "123"), lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(short_tax, EngineError::InvalidInput(_)));

    let client = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), lawyer.id)
        .await
        .unwrap();
    let dup = engine
        .create_client(client_cmd("Maria Souza", "12345678901"), lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(dup, EngineError::ExistingKey(_)));

    engine
        .create_client(client_cmd("Maria Silva", "12345678901"), other.id)
        .await
        .unwrap();
    let foreign = engine.client(client.id, other.id).await.unwrap_err();
    assert!(matches!(foreign, EngineError::KeyNotFound(_)));

    let found = engine.search_clients("silva", lawyer.id).await.unwrap();
    assert_eq!(found.len(), 1);
    let in_state = engine
        .list_clients(
            &ClientListFilter {
                state: Some("pe".to_string()),
                ..Default::default()
            },
            lawyer.id,
        )
        .await
        .unwrap();
    assert_eq!(in_state.len(), 1);
    assert_eq!(engine.count_clients(lawyer.id).await.unwrap(), 1);
}

#[tokio::test]
async fn cases_track_fees() {
    let engine = engine_with_db().await;
    let lawyer = provision(&engine, "Dr. Lima", "lima@example.com", UserRole::Lawyer).await;
    let client = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), lawyer.id)
        .await
        .unwrap();

    let case = engine
        .create_case(case_cmd(client.id, "0001-2025", Some(1_000_00)), lawyer.id)
        .await
        .unwrap();
    assert_eq!(case.status, CaseStatus::Active);
    assert_eq!(case.client_name, "Maria Silva");
    assert_eq!(case.remaining_fee_minor(), 1_000_00);

    engine
        .create_case(case_cmd(client.id, "0002-2025", None), lawyer.id)
        .await
        .unwrap();
    let dup = engine
        .create_case(case_cmd(client.id, "0001-2025", None), lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(dup, EngineError::ExistingKey(_)));

    let paid = engine
        .register_fee_payment(case.id, 400_00, lawyer.id)
        .await
        .unwrap();
    assert_eq!(paid.fees_paid_minor, 400_00);
    assert!(!paid.fully_paid());

    let open = engine.open_fee_cases(lawyer.id).await.unwrap();
    assert_eq!(open.len(), 1);

    let totals = engine.fee_totals(lawyer.id).await.unwrap();
    assert_eq!(totals.total, 1_000_00);
    assert_eq!(totals.paid, 400_00);
    assert_eq!(totals.remaining, 600_00);

    engine
        .register_fee_payment(case.id, 600_00, lawyer.id)
        .await
        .unwrap();
    assert!(engine.open_fee_cases(lawyer.id).await.unwrap().is_empty());

    let bad_payment = engine
        .register_fee_payment(case.id, 0, lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(bad_payment, EngineError::InvalidAmount(_)));

    let stats = engine.case_stats(lawyer.id).await.unwrap();
    assert_eq!(stats.total, 2);
    assert!(stats.by_status.contains(&(CaseStatus::Active, 2)));

    let in_use = engine.delete_client(client.id, lawyer.id).await.unwrap_err();
    assert!(matches!(in_use, EngineError::InUse(_)));
    let listed = engine.client(client.id, lawyer.id).await.unwrap();
    assert_eq!(listed.total_cases, 2);
}

#[tokio::test]
async fn fees_are_bounded() {
    let engine = engine_with_db().await;
    let lawyer = provision(&engine, "Dr. Lima", "lima@example.com", UserRole::Lawyer).await;
    let client = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), lawyer.id)
        .await
        .unwrap();

    let too_big = engine
        .create_case(
            case_cmd(client.id, "0001-2025", Some(MAX_AMOUNT_MINOR + 1)),
            lawyer.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(too_big, EngineError::InvalidAmount(_)));
    let overpaid = engine
        .create_case(
            CaseCmd {
                fees_paid_minor: Some(MAX_AMOUNT_MINOR + 1),
                ..case_cmd(client.id, "0001-2025", None)
            },
            lawyer.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(overpaid, EngineError::InvalidAmount(_)));

    let first = engine
        .create_case(case_cmd(client.id, "0001-2025", Some(MAX_AMOUNT_MINOR)), lawyer.id)
        .await
        .unwrap();
    let second = engine
        .create_case(case_cmd(client.id, "0002-2025", Some(MAX_AMOUNT_MINOR)), lawyer.id)
        .await
        .unwrap();
    engine
        .register_fee_payment(first.id, MAX_AMOUNT_MINOR, lawyer.id)
        .await
        .unwrap();
    let beyond = engine
        .register_fee_payment(first.id, 1, lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(beyond, EngineError::InvalidAmount(_)));
    let huge = engine
        .register_fee_payment(second.id, i64::MAX, lawyer.id)
        .await
        .unwrap_err();
    assert!(matches!(huge, EngineError::InvalidAmount(_)));

    let totals = engine.fee_totals(lawyer.id).await.unwrap();
    assert_eq!(totals.total, 2 * MAX_AMOUNT_MINOR);
    assert_eq!(totals.paid, MAX_AMOUNT_MINOR);
    assert_eq!(totals.remaining, MAX_AMOUNT_MINOR);
}

#[tokio::test]
async fn case_validation_and_search() {
    let engine = engine_with_db().await;
    let lawyer = provision(&engine, "Dr. Lima", "lima@example.com", UserRole::Lawyer).await;
    let client = engine
        .create_client(client_cmd("Maria Silva", "12345678901"), lawyer.id)
        .await
        .unwrap();

    let mut backwards = case_cmd(client.id, "0003-2025", None);
    backwards.end_date = Some(day(2024, 12, 31));
    let err = engine.create_case(backwards, lawyer.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let mut terse = case_cmd(client.id, "0003-2025", None);
    terse.description = "short".to_string();
    let err = engine.create_case(terse, lawyer.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let case = engine
        .create_case(case_cmd(client.id, "0003-2025", None), lawyer.id)
        .await
        .unwrap();

    let mut finished = case_cmd(client.id, "0003-2025", None);
    finished.status = Some(CaseStatus::Finished);
    finished.end_date = Some(day(2025, 6, 1));
    let updated = engine.update_case(case.id, finished, lawyer.id).await.unwrap();
    assert_eq!(updated.status, CaseStatus::Finished);

    let by_status = engine
        .list_cases(
            &CaseListFilter {
                status: Some(CaseStatus::Finished),
                ..Default::default()
            },
            lawyer.id,
        )
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(engine.search_cases("maria", lawyer.id).await.unwrap().len(), 1);
    assert_eq!(engine.search_cases("overtime", lawyer.id).await.unwrap().len(), 1);
    assert_eq!(engine.cases_by_client(client.id, lawyer.id).await.unwrap().len(), 1);

    engine.delete_case(case.id, lawyer.id).await.unwrap();
    engine.delete_client(client.id, lawyer.id).await.unwrap();
}

#[tokio::test]
async fn import_records_have_unique_file_names() {
    let engine = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;

    let cmd = ImportRecordCmd {
        extracted_on: day(2025, 3, 1),
        bank: "Nubank".to_string(),
        period: "2025-02".to_string(),
        file_name: "nubank-2025-02.ofx".to_string(),
    };
    let record = engine.create_import_record(cmd.clone(), ana.id).await.unwrap();
    let dup = engine.create_import_record(cmd.clone(), ana.id).await.unwrap_err();
    assert!(matches!(dup, EngineError::ExistingKey(_)));

    let future = engine
        .create_import_record(
            ImportRecordCmd {
                extracted_on: day(2999, 1, 1),
                file_name: "later.ofx".to_string(),
                ..cmd.clone()
            },
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(future, EngineError::InvalidInput(_)));

    let listed = engine
        .list_import_records(
            &ImportRecordListFilter {
                bank: Some("nubank".to_string()),
                ..Default::default()
            },
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let other = engine
        .create_import_record(
            ImportRecordCmd {
                file_name: "nubank-2025-03.ofx".to_string(),
                period: "2025-03".to_string(),
                ..cmd.clone()
            },
            ana.id,
        )
        .await
        .unwrap();
    let taken = engine
        .update_import_record(
            other.id,
            ImportRecordCmd {
                file_name: "nubank-2025-02.ofx".to_string(),
                ..cmd.clone()
            },
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(taken, EngineError::ExistingKey(_)));
    let moved_to_future = engine
        .update_import_record(
            other.id,
            ImportRecordCmd {
                extracted_on: day(2999, 1, 1),
                file_name: "nubank-2025-03.ofx".to_string(),
                ..cmd.clone()
            },
            ana.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(moved_to_future, EngineError::InvalidInput(_)));
    let renamed = engine
        .update_import_record(
            record.id,
            ImportRecordCmd {
                bank: "Inter".to_string(),
                ..cmd.clone()
            },
            ana.id,
        )
        .await
        .unwrap();
    assert_eq!(renamed.bank, "Inter");

    engine.delete_import_record(record.id, ana.id).await.unwrap();
    assert!(matches!(
        engine.import_record(record.id, ana.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}
