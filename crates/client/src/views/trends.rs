use crate::api::HealthTrendsClient;
use crate::ClientResult;
use healthtrends_core::models::{AvailableTest, MonthlyTrends, RiskAnalysis, TrendHistory};
use healthtrends_core::DateRange;

/// Test picker, date range and loaded series for one patient.
///
/// Shared by the doctor and patient screens; only the doctor screen loads risk analysis.
#[derive(Clone, Debug)]
pub struct TrendPanel {
    include_risk: bool,
    tests: Vec<AvailableTest>,
    selected: Option<String>,
    range: DateRange,
    history: Option<TrendHistory>,
    monthly: Option<MonthlyTrends>,
    risk: Option<RiskAnalysis>,
}

impl TrendPanel {
    pub fn new(range: DateRange, include_risk: bool) -> Self {
        Self {
            include_risk,
            tests: Vec::new(),
            selected: None,
            range,
            history: None,
            monthly: None,
            risk: None,
        }
    }

    pub fn tests(&self) -> &[AvailableTest] {
        &self.tests
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn history(&self) -> Option<&TrendHistory> {
        self.history.as_ref()
    }

    pub fn monthly(&self) -> Option<&MonthlyTrends> {
        self.monthly.as_ref()
    }

    pub fn risk(&self) -> Option<&RiskAnalysis> {
        self.risk.as_ref()
    }

    /// Alert text for the loaded risk analysis, if it should be shown.
    pub fn risk_headline(&self) -> Option<String> {
        self.risk.as_ref().and_then(RiskAnalysis::headline)
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    /// Select a test by code. Codes are compared case-insensitively; unknown codes are ignored.
    pub fn select(&mut self, code: &str) -> bool {
        match self
            .tests
            .iter()
            .find(|t| t.test_code.eq_ignore_ascii_case(code))
        {
            Some(t) => {
                self.selected = Some(t.test_code.clone());
                true
            }
            None => false,
        }
    }

    /// Drop everything loaded for the previous patient.
    pub fn clear(&mut self) {
        self.tests.clear();
        self.selected = None;
        self.clear_series();
    }

    fn clear_series(&mut self) {
        self.history = None;
        self.monthly = None;
        self.risk = None;
    }

    /// Load the tests this patient has results for.
    ///
    /// The current selection is kept when it is still available, otherwise the first test is
    /// selected.
    pub async fn load_tests(
        &mut self,
        client: &HealthTrendsClient,
        patient_id: &str,
    ) -> ClientResult<()> {
        let tests = match client.available_tests(patient_id).await {
            Ok(tests) => tests,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        let keep = self
            .selected
            .as_deref()
            .is_some_and(|sel| tests.iter().any(|t| t.test_code == sel));
        if !keep {
            self.selected = tests.first().map(|t| t.test_code.clone());
        }

        tracing::debug!(
            "{} tests available for {}, selected {:?}",
            tests.len(),
            patient_id,
            self.selected
        );
        self.tests = tests;
        Ok(())
    }

    /// Load the series for the selected test.
    ///
    /// The daily history is always fetched for the current range. The monthly aggregate is only
    /// fetched when the range spans more than 90 days and is cleared otherwise. A failed risk
    /// fetch clears the alert without failing the load.
    pub async fn smart_load(
        &mut self,
        client: &HealthTrendsClient,
        patient_id: &str,
    ) -> ClientResult<()> {
        let Some(code) = self.selected.clone() else {
            self.clear_series();
            return Ok(());
        };

        let history = match client.trend_history(patient_id, &code, &self.range).await {
            Ok(history) => history,
            Err(e) => {
                self.clear_series();
                return Err(e);
            }
        };
        self.history = Some(history);

        self.monthly = if self.range.wants_monthly() {
            match client.monthly_trends(patient_id, &code).await {
                Ok(monthly) => Some(monthly),
                Err(e) => {
                    self.monthly = None;
                    self.risk = None;
                    return Err(e);
                }
            }
        } else {
            None
        };

        self.risk = if self.include_risk {
            match client.risk_analysis(patient_id, &code).await {
                Ok(risk) => Some(risk),
                Err(e) => {
                    tracing::warn!("risk analysis unavailable for {}/{}: {}", patient_id, code, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(())
    }
}
