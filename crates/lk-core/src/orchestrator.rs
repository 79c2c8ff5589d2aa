//! Multi-law orchestration.
//!
//! One call validates the configuration, prepares the dataset once, fans the
//! selected laws out to scoped threads and merges the outcomes in the
//! requested order. A data error skips its law; a computation error fails
//! it; a configuration error aborts the whole call.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use lk_common::result::RankedLaw;
use lk_common::{
    AnalyzerResult, CompositeResult, DiagnosticReport, Error, LawIssue, LawKind, LawVerdict,
    Recommendation, Result, ValidationReport,
};
use lk_config::{fingerprint, AnalysisConfig};
use tracing::{error, info, instrument, warn, Span};

use crate::dataset::Dataset;
use crate::diagnose as diag;
use crate::laws;
use crate::logging::generate_run_id;

/// Ordered, duplicate-free set of laws to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawSelection(Vec<LawKind>);

impl LawSelection {
    pub fn all() -> Self {
        LawSelection(LawKind::ALL.to_vec())
    }

    /// Selection in first-mention order; duplicates are dropped.
    pub fn of<I: IntoIterator<Item = LawKind>>(laws: I) -> Self {
        let mut out = Vec::new();
        for law in laws {
            if !out.contains(&law) {
                out.push(law);
            }
        }
        LawSelection(out)
    }

    /// Parse `all` or a comma/space separated list of names and short codes.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut laws = Vec::new();
        for token in spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if token.eq_ignore_ascii_case("all") {
                laws.extend(LawKind::ALL);
            } else {
                laws.push(token.parse::<LawKind>()?);
            }
        }
        if laws.is_empty() {
            return Err(Error::config("laws", "no law selected"));
        }
        Ok(LawSelection::of(laws))
    }

    pub fn laws(&self) -> &[LawKind] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn single(&self) -> Option<LawKind> {
        match self.0.as_slice() {
            [law] => Some(*law),
            _ => None,
        }
    }
}

impl Default for LawSelection {
    fn default() -> Self {
        LawSelection::all()
    }
}

impl From<LawKind> for LawSelection {
    fn from(law: LawKind) -> Self {
        LawSelection(vec![law])
    }
}

impl FromStr for LawSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LawSelection::parse(s)
    }
}

impl fmt::Display for LawSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|l| l.name()).collect();
        f.write_str(&names.join(","))
    }
}

/// Shared flag a caller flips to abandon an in-flight call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Rank executed laws by how comfortably the sample clears each minimum.
///
/// Ties keep the requested order.
pub fn recommend(results: &[AnalyzerResult]) -> Option<Recommendation> {
    let mut ranked: Vec<RankedLaw> = results
        .iter()
        .map(|r| RankedLaw {
            law: r.law,
            sample_count: r.sample_count,
            minimum_sample: r.minimum_sample,
            headroom: r.sample_count as f64 / r.minimum_sample.max(1) as f64,
            risk_level: r.risk_level,
        })
        .collect();
    ranked.sort_by(|a, b| b.headroom.total_cmp(&a.headroom));
    let top = ranked.first()?;
    let rationale = format!(
        "trust {} first: {} values against a minimum of {} ({:.1}x headroom)",
        top.law, top.sample_count, top.minimum_sample, top.headroom
    );
    Some(Recommendation { ranked, rationale })
}

fn run_laws(dataset: &Dataset, laws: &[LawKind], config: &AnalysisConfig) -> Vec<Result<AnalyzerResult>> {
    let parent = Span::current();
    thread::scope(|s| {
        let handles: Vec<_> = laws
            .iter()
            .map(|&law| {
                let parent = parent.clone();
                s.spawn(move || {
                    let _entered = parent.enter();
                    laws::dispatch(law, dataset, config)
                })
            })
            .collect();
        handles
            .into_iter()
            .zip(laws)
            .map(|(h, &law)| {
                h.join().unwrap_or_else(|_| {
                    error!(law = %law, "analyzer thread panicked");
                    Err(Error::computation(law, "analyzer panicked"))
                })
            })
            .collect()
    })
}

fn run<'d>(
    dataset: &'d Dataset,
    selection: &LawSelection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<(CompositeResult, Cow<'d, Dataset>)> {
    config.validate()?;
    cancel.check()?;
    let single = selection.single();
    if selection.is_empty() {
        return Err(Error::config("laws", "no law selected"));
    }
    if dataset.is_empty() {
        return Err(Error::empty(single));
    }
    let prepared = dataset.conform(config);
    if prepared.is_empty() {
        return Err(Error::empty(single));
    }

    let outcomes = run_laws(&prepared, selection.laws(), config);
    cancel.check()?;

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();
    let mut last_error = None;
    for (&law, outcome) in selection.laws().iter().zip(outcomes) {
        match outcome {
            Ok(result) => {
                info!(law = %law, risk = %result.risk_level, p_value = result.p_value, "law analyzed");
                results.push(result);
            }
            Err(err @ Error::Config { .. }) | Err(err @ Error::Toml(_)) => return Err(err),
            Err(err) => {
                let issue = LawIssue {
                    law,
                    code: err.code(),
                    message: err.to_string(),
                };
                if err.is_skippable() {
                    warn!(law = %law, code = issue.code, reason = %issue.message, "law skipped");
                    skipped.push(issue);
                } else {
                    error!(law = %law, code = issue.code, reason = %issue.message, "law failed");
                    failed.push(issue);
                }
                last_error = Some(err);
            }
        }
    }

    if results.is_empty() {
        return Err(match (single, last_error) {
            (Some(_), Some(err)) => err,
            _ => Error::NoLawExecuted {
                skipped: skipped.len(),
                failed: failed.len(),
            },
        });
    }

    let recommendation = if config.recommend {
        recommend(&results)
    } else {
        None
    };
    let composite = CompositeResult {
        run_id: generate_run_id(),
        config_fingerprint: fingerprint(config),
        dataset: prepared.summary(),
        laws_executed: results.len(),
        results,
        skipped,
        failed,
        conflicts: Vec::new(),
        recommendation,
    };
    Ok((composite, prepared))
}

/// Run the selected laws and merge their results.
pub fn analyze(dataset: &Dataset, laws: &LawSelection, config: &AnalysisConfig) -> Result<CompositeResult> {
    analyze_with_cancel(dataset, laws, config, &CancellationToken::new())
}

#[instrument(skip_all, fields(laws = %laws, n = dataset.len()))]
pub fn analyze_with_cancel(
    dataset: &Dataset,
    laws: &LawSelection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<CompositeResult> {
    run(dataset, laws, config, cancel).map(|(composite, _)| composite)
}

/// Analyze, then judge each law against `config.pass_threshold`.
pub fn validate(dataset: &Dataset, laws: &LawSelection, config: &AnalysisConfig) -> Result<ValidationReport> {
    validate_with_cancel(dataset, laws, config, &CancellationToken::new())
}

#[instrument(skip_all, fields(laws = %laws, n = dataset.len()))]
pub fn validate_with_cancel(
    dataset: &Dataset,
    laws: &LawSelection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<ValidationReport> {
    let (composite, _) = run(dataset, laws, config, cancel)?;
    let verdicts: Vec<LawVerdict> = composite
        .results
        .iter()
        .map(|r| LawVerdict {
            law: r.law,
            risk_level: r.risk_level,
            pass_threshold: config.pass_threshold,
            passed: r.risk_level <= config.pass_threshold,
        })
        .collect();
    let is_valid = verdicts.iter().all(|v| v.passed);
    let quality_score = composite
        .results
        .iter()
        .map(|r| r.risk_level.quality_score())
        .sum::<f64>()
        / composite.results.len() as f64;
    info!(is_valid, quality_score, "validation complete");
    Ok(ValidationReport {
        composite,
        verdicts,
        is_valid,
        quality_score,
    })
}

/// Analyze, then compare laws pairwise and describe the data.
pub fn diagnose(dataset: &Dataset, laws: &LawSelection, config: &AnalysisConfig) -> Result<DiagnosticReport> {
    diagnose_with_cancel(dataset, laws, config, &CancellationToken::new())
}

#[instrument(skip_all, fields(laws = %laws, n = dataset.len()))]
pub fn diagnose_with_cancel(
    dataset: &Dataset,
    laws: &LawSelection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<DiagnosticReport> {
    let (mut composite, prepared) = run(dataset, laws, config, cancel)?;
    composite.conflicts = diag::conflicts(&composite.results);
    let consistency_score = diag::consistency_score(&composite.results);
    let overall_assessment = diag::overall_assessment(&composite.results, &composite.conflicts);
    if !composite.conflicts.is_empty() {
        warn!(conflicts = composite.conflicts.len(), "laws disagree");
    }
    Ok(DiagnosticReport {
        characteristics: diag::characteristics(&prepared),
        composite,
        consistency_score,
        overall_assessment,
        method_note: diag::METHOD_NOTE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing() {
        let sel = LawSelection::parse("benf, Pareto zipf,benford").unwrap();
        assert_eq!(sel.laws(), &[LawKind::Benford, LawKind::Pareto, LawKind::Zipf]);
        assert_eq!(LawSelection::parse("ALL").unwrap(), LawSelection::all());
        assert_eq!(sel.to_string(), "benford,pareto,zipf");

        let err = LawSelection::parse("benf,gauss").unwrap_err();
        assert_eq!(err.code(), 20);
        assert!(err.to_string().contains("gauss"));
        assert!(LawSelection::parse(" , ").is_err());
    }

    #[test]
    fn recommendation_prefers_headroom_and_keeps_order_on_ties() {
        let ds = Dataset::from_values((1..=40).map(f64::from));
        let mut config = AnalysisConfig::default();
        config.recommend = true;
        let sel = LawSelection::of([LawKind::Normal, LawKind::Pareto, LawKind::Zipf]);
        let composite = analyze(&ds, &sel, &config).unwrap();
        let rec = composite.recommendation.unwrap();
        // Pareto needs 2 values, Normal and Zipf need 3.
        assert_eq!(rec.primary(), Some(LawKind::Pareto));
        assert_eq!(rec.ranked[1].law, LawKind::Normal);
        assert_eq!(rec.ranked[2].law, LawKind::Zipf);
    }

    #[test]
    fn cancelled_token_returns_no_partial_result() {
        let token = CancellationToken::new();
        token.cancel();
        let ds = Dataset::from_values((1..=100).map(f64::from));
        let err = analyze_with_cancel(&ds, &LawSelection::all(), &AnalysisConfig::default(), &token)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn invalid_config_aborts_before_analysis() {
        let mut config = AnalysisConfig::default();
        config.confidence_level = 1.5;
        let ds = Dataset::from_values((1..=100).map(f64::from));
        let err = analyze(&ds, &LawSelection::all(), &config).unwrap_err();
        assert_eq!(err.code(), 20);
    }

    #[test]
    fn single_law_surfaces_its_own_error() {
        let ds = Dataset::from_values([1.0, 2.0]);
        let err = analyze(&ds, &LawKind::Poisson.into(), &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), 11);
        assert_eq!(err.law(), Some(LawKind::Poisson));
    }

    #[test]
    fn diagnose_attaches_cross_law_findings() {
        let ds = Dataset::from_values((1..=60).map(|i| f64::from(i % 7)));
        let sel = LawSelection::of([LawKind::Normal, LawKind::Poisson]);
        let report = diagnose(&ds, &sel, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.method_note, diag::METHOD_NOTE);
        assert_eq!(report.composite.conflicts, diag::conflicts(&report.composite.results));
        assert!((0.0..=1.0).contains(&report.consistency_score));
    }

    #[test]
    fn nothing_executed_across_several_laws() {
        let ds = Dataset::from_values([7.0]);
        let sel = LawSelection::of([LawKind::Normal, LawKind::Poisson]);
        let err = analyze(&ds, &sel, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NoLawExecuted { skipped: 2, failed: 0 }));
    }
}
