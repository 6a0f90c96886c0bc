use tabled::Tabled;

#[derive(Tabled)]
pub struct ResultRow {
    #[tabled(rename = "Suite")]
    pub suite: String,
    #[tabled(rename = "Test")]
    pub test: String,
    #[tabled(rename = "Verdict")]
    pub verdict: &'static str,
    #[tabled(rename = "Detail")]
    pub detail: String,
}

#[derive(Tabled)]
pub struct SuiteRow {
    #[tabled(rename = "Suite")]
    pub suite: String,
    #[tabled(rename = "Match")]
    pub matched: usize,
    #[tabled(rename = "Diverge")]
    pub diverged: usize,
    #[tabled(rename = "Inconclusive")]
    pub inconclusive: usize,
}

#[derive(Tabled)]
pub struct ProblemRow {
    #[tabled(rename = "Suite")]
    pub suite: String,
    #[tabled(rename = "Test", display = "display_test")]
    pub test: Option<String>,
    #[tabled(rename = "Problem")]
    pub problem: String,
}

fn display_test(test: &Option<String>) -> String {
    test.clone().unwrap_or_else(|| "-".to_string())
}
