use patch_text::Patch;
use pretty_assertions::assert_eq;
use serde::Deserialize;

/// `ScenarioDocument` represents a convergence test case: a base text and
/// two concurrent patches authored against it, in their wire form, with
/// the text both peers must end up with.
///
/// The scenario is checked from both sides: the peer that committed
/// `local` first applies the transformed `remote`, and the peer that
/// committed `remote` first applies the transformed `local`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ScenarioDocument {
    description: String,
    base: String,
    local: String,
    remote: String,
    expected: String,
}

impl ScenarioDocument {
    /// Asserts that both peers converge on the expected text.
    ///
    /// # Panics
    ///
    /// If either peer fails to apply its patches or ends up with a
    /// different text.
    pub fn assert_converges(&self) {
        let local = self.parse(&self.local);
        let remote = self.parse(&self.remote);

        let with_local_committed = self.apply_both(&local, &remote);
        let with_remote_committed = self.apply_both(&remote, &local);

        assert_eq!(with_local_committed, self.expected, "{}", self.description);
        assert_eq!(with_remote_committed, self.expected, "{}", self.description);
    }

    fn apply_both(&self, committed: &Patch, incoming: &Patch) -> String {
        let text = committed
            .apply(&self.base)
            .unwrap_or_else(|error| panic!("{}: {error}", self.description));

        incoming
            .transform(std::slice::from_ref(committed))
            .and_then(|transformed| transformed.apply(&text))
            .unwrap_or_else(|error| panic!("{}: {error}", self.description))
    }

    fn parse(&self, wire: &str) -> Patch {
        wire.parse()
            .unwrap_or_else(|error| panic!("{}: {error}", self.description))
    }
}
