//! Dashboard state and file-list reconciliation.
//!
//! [`DashboardController`] owns the displayed file list. Reconciliation
//! rules: a fetch replaces the list wholesale; a record arriving from the
//! upload broadcaster is appended unless it matches the last-appended
//! record (dedup is against that one record only, not the whole list); a
//! delete removes the matching identifier only after the backend confirmed
//! it. All mutation happens on the single UI task, so the controller is
//! plain state with no locking.

use api::models::{FileInfo, FileInfoPage};

/// Displayed dashboard state.
#[derive(Debug, Default)]
pub struct DashboardController {
    /// The displayed file list.
    files: Vec<FileInfo>,
    /// The record most recently appended from the upload stream.
    last_added: Option<FileInfo>,
    /// Subject of the decoded login token, for the header line.
    user_email: Option<String>,
}

impl DashboardController {
    /// Creates an empty dashboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The displayed files, in display order.
    pub fn files(&self) -> &[FileInfo] {
        &self.files
    }

    /// Email shown in the header, when a token was decoded.
    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    /// Sets the email shown in the header.
    pub fn set_user_email(&mut self, email: impl Into<String>) {
        self.user_email = Some(email.into());
    }

    /// Replaces the displayed list wholesale with a fetched page.
    pub fn replace_files(&mut self, page: FileInfoPage) {
        self.files = page.content;
    }

    /// Applies a record from the upload completion stream.
    ///
    /// Appends unless the record matches the last-appended one, so a
    /// re-delivered completion is never shown twice in direct succession.
    /// Returns whether the record was appended.
    pub fn apply_uploaded(&mut self, info: FileInfo) -> bool {
        if self
            .last_added
            .as_ref()
            .is_some_and(|last| last.id == info.id)
        {
            return false;
        }

        self.files.push(info.clone());
        self.last_added = Some(info);
        true
    }

    /// Removes the entry for a backend-confirmed delete.
    ///
    /// Must only be called after the delete request succeeded; there is no
    /// optimistic removal. Returns whether an entry was removed.
    pub fn confirm_deleted(&mut self, id: i64) -> bool {
        let before = self.files.len();
        self.files.retain(|info| info.id != id);
        self.files.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::models::FileKind;

    fn record(id: i64, name: &str) -> FileInfo {
        FileInfo {
            id,
            name: name.to_string(),
            file_type: FileKind::File,
            size: 1,
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        }
    }

    fn page(files: Vec<FileInfo>) -> FileInfoPage {
        let total = files.len() as u64;
        FileInfoPage {
            content: files,
            total_elements: total,
            total_pages: 1,
            number: 0,
            size: 50,
        }
    }

    #[test]
    fn fetch_replaces_the_list_entirely() {
        let mut dashboard = DashboardController::new();
        dashboard.replace_files(page(vec![record(1, "a"), record(2, "b")]));
        assert_eq!(dashboard.files().len(), 2);

        dashboard.replace_files(page(vec![record(3, "c")]));

        assert_eq!(dashboard.files().len(), 1);
        assert_eq!(dashboard.files()[0].id, 3);
    }

    #[test]
    fn uploaded_record_is_appended() {
        let mut dashboard = DashboardController::new();
        dashboard.replace_files(page(vec![record(1, "a")]));

        assert!(dashboard.apply_uploaded(record(2, "b")));

        assert_eq!(dashboard.files().len(), 2);
        assert_eq!(dashboard.files()[1].id, 2);
    }

    #[test]
    fn same_record_is_never_appended_twice_in_direct_succession() {
        let mut dashboard = DashboardController::new();

        assert!(dashboard.apply_uploaded(record(5, "x")));
        assert!(!dashboard.apply_uploaded(record(5, "x")));
        assert!(!dashboard.apply_uploaded(record(5, "x")));

        assert_eq!(dashboard.files().len(), 1);
    }

    #[test]
    fn dedup_checks_only_the_last_appended_record() {
        let mut dashboard = DashboardController::new();

        assert!(dashboard.apply_uploaded(record(1, "a")));
        assert!(dashboard.apply_uploaded(record(2, "b")));
        // Not a direct repeat, so id 1 goes in again.
        assert!(dashboard.apply_uploaded(record(1, "a")));

        assert_eq!(dashboard.files().len(), 3);
    }

    #[test]
    fn confirmed_delete_removes_exactly_the_matching_id() {
        let mut dashboard = DashboardController::new();
        dashboard.replace_files(page(vec![record(1, "a"), record(2, "b"), record(3, "c")]));

        assert!(dashboard.confirm_deleted(2));

        let ids: Vec<_> = dashboard.files().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn delete_of_unknown_id_changes_nothing() {
        let mut dashboard = DashboardController::new();
        dashboard.replace_files(page(vec![record(1, "a")]));

        assert!(!dashboard.confirm_deleted(99));
        assert_eq!(dashboard.files().len(), 1);
    }

    #[test]
    fn header_email_is_settable() {
        let mut dashboard = DashboardController::new();
        assert_eq!(dashboard.user_email(), None);

        dashboard.set_user_email("user@example.com");
        assert_eq!(dashboard.user_email(), Some("user@example.com"));
    }
}
