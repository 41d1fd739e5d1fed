use super::*;
use crate::test_support::pdf;

#[tokio::test]
async fn offline_backend_assigns_increasing_ids() {
    let backend = OfflineUploadBackend::new();
    let (tx, rx) = watch::channel(UploadProgress::Indeterminate);

    let first = backend.upload_resume(&pdf("a.pdf"), tx.clone()).await.expect("first");
    let second = backend.upload_resume(&pdf("b.pdf"), tx).await.expect("second");

    assert_eq!(first.id, ResumeId(1));
    assert_eq!(second.id, ResumeId(2));
    assert_eq!(second.filename, "b.pdf");
    assert!(second.created_at.is_some());
    assert_eq!(*rx.borrow(), UploadProgress::Indeterminate);
}

#[tokio::test]
async fn offline_backend_keeps_plain_text_contents() {
    let backend = OfflineUploadBackend::new();
    let (tx, _rx) = watch::channel(UploadProgress::Indeterminate);
    let txt = SelectedFile::new("cv.txt", "text/plain", b"Rust, SQL".to_vec());

    let record = backend.upload_resume(&txt, tx).await.expect("upload");
    assert_eq!(record.text, "Rust, SQL");

    let pdf_record = backend
        .upload_job(&pdf("jd.pdf"), "Data Scientist")
        .await
        .expect("job");
    assert_eq!(pdf_record.title.as_deref(), Some("Data Scientist"));
    assert_eq!(pdf_record.text.as_deref(), Some(""));
}

#[tokio::test]
async fn offline_backend_has_no_stored_history() {
    let backend = OfflineUploadBackend::default();
    assert!(backend.list_resumes().await.expect("resumes").is_empty());
    assert!(backend.list_jobs().await.expect("jobs").is_empty());
}
