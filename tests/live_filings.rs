use edgardump::{Edgar, FilingOperations, FilingOptions};

#[tokio::test]
#[ignore]
async fn filing_history_includes_older_pages() {
    let edgar = Edgar::new("test_agent example@example.com").unwrap();

    let recent = edgar.get_recent_filings("320193").await.unwrap();
    let history = edgar.filing_history("320193").await.unwrap();

    assert!(!recent.is_empty());
    assert!(history.len() > recent.len());
}

#[tokio::test]
#[ignore]
async fn filtered_filings() {
    let edgar = Edgar::new("test_agent example@example.com").unwrap();

    let opts = FilingOptions::new().with_form_type("10-Q").with_limit(3);
    let filings = edgar.filings("1830033", Some(opts)).await.unwrap();

    assert_eq!(filings.len(), 3);
    assert!(filings.iter().all(|f| f.form == "10-Q"));
}

#[tokio::test]
#[ignore]
async fn primary_document() {
    let edgar = Edgar::new("test_agent example@example.com").unwrap();

    let opts = FilingOptions::new().with_form_type("10-K").with_limit(1);
    let filings = edgar.filings("1830033", Some(opts)).await.unwrap();
    let html = edgar.primary_document("1830033", &filings[0]).await.unwrap();

    assert!(html.len() > 1000);
    assert!(html.to_lowercase().contains("<html"));
}
