// Account working set - the ordered batch of account numbers being assembled
// Grows via manual entry or spreadsheet import, shrinks via explicit removal

// ============================================================================
// WORKING SET
// ============================================================================

/// An ordered sequence of unique account numbers.
///
/// Insertion order is preserved for display. Duplicates (exact string match,
/// case-sensitive) are silently rejected on add. The set lives only as long
/// as the view that owns it; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct AccountWorkingSet {
    accounts: Vec<String>,
}

impl AccountWorkingSet {
    pub fn new() -> Self {
        AccountWorkingSet {
            accounts: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, account: &str) -> bool {
        self.accounts.iter().any(|a| a == account)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.accounts
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.accounts.iter()
    }

    /// Add a single account number.
    ///
    /// No-op if the value is empty or already present. Returns true when the
    /// value was actually appended (callers clear their input field on true).
    pub fn add(&mut self, account: &str) -> bool {
        if account.is_empty() || self.contains(account) {
            return false;
        }
        self.accounts.push(account.to_string());
        true
    }

    /// Remove an account number. Returns true if an entry was removed.
    pub fn remove(&mut self, account: &str) -> bool {
        match self.accounts.iter().position(|a| a == account) {
            Some(index) => {
                self.accounts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Append already-vetted accounts (from a spreadsheet import) in order.
    ///
    /// Existing entries are never reordered or removed. Goes through `add`
    /// so the uniqueness invariant holds even if the caller's filtering and
    /// the current set ever disagree.
    pub fn append_all(&mut self, accounts: &[String]) {
        for account in accounts {
            self.add(account);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_at_end() {
        let mut set = AccountWorkingSet::new();
        assert!(set.add("100"));
        assert!(set.add("200"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), &["100".to_string(), "200".to_string()]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = AccountWorkingSet::new();
        assert!(set.add("100"));
        assert!(!set.add("100"));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty() {
        let mut set = AccountWorkingSet::new();
        assert!(!set.add(""));
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_is_case_sensitive() {
        let mut set = AccountWorkingSet::new();
        assert!(set.add("abc"));
        assert!(set.add("ABC"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_existing() {
        let mut set = AccountWorkingSet::new();
        set.add("100");
        set.add("200");

        assert!(set.remove("100"));
        assert_eq!(set.as_slice(), &["200".to_string()]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = AccountWorkingSet::new();
        set.add("100");

        assert!(!set.remove("999"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_append_all_preserves_order() {
        let mut set = AccountWorkingSet::new();
        set.add("100");

        set.append_all(&["300".to_string(), "400".to_string()]);
        assert_eq!(
            set.as_slice(),
            &["100".to_string(), "300".to_string(), "400".to_string()]
        );
    }
}
