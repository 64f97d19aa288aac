use crate::helpers::TestPostgres;

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_test_suite_starting_up_when_initializing_postgres_container_then_migrations_create_tables()
 {
    let test_pg = TestPostgres::new().await;

    let (jobs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transcription_jobs")
        .fetch_one(&test_pg.pool)
        .await
        .expect("Failed to query transcription_jobs table");
    let (interviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM interviews")
        .fetch_one(&test_pg.pool)
        .await
        .expect("Failed to query interviews table");

    assert_eq!(jobs, 0);
    assert_eq!(interviews, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_completed_row_without_transcript_when_inserting_then_check_constraint_rejects() {
    let test_pg = TestPostgres::new().await;

    let result = sqlx::query(
        "INSERT INTO transcription_jobs (interview_id, status, video_url, created_at, updated_at)
         VALUES ('job-x', 'completed', 'https://v', now(), now())",
    )
    .execute(&test_pg.pool)
    .await;

    assert!(result.is_err());
}
