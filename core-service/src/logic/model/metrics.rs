//! Evaluation Metrics
//!
//! Per-class precision / recall / F1, accuracy, macro and weighted averages,
//! and a 2x2 confusion matrix (rows = true label, columns = predicted).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tree::N_CLASSES;

/// Display names for class rows
pub const CLASS_NAMES: [&str; N_CLASSES] = ["Normal (0)", "Theft (1)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// counts[true][predicted]
    pub counts: [[u64; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = [[0u64; N_CLASSES]; N_CLASSES];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t as usize][p as usize] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn true_positives(&self, class: usize) -> u64 {
        self.counts[class][class]
    }

    /// Rows of this class (true count)
    pub fn support(&self, class: usize) -> u64 {
        self.counts[class].iter().sum()
    }

    /// Rows predicted as this class
    pub fn predicted(&self, class: usize) -> u64 {
        self.counts.iter().map(|row| row[class]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix (rows: true label, columns: predicted label)")?;
        writeln!(f, "{:>14} {:>12} {:>12}", "", CLASS_NAMES[0], CLASS_NAMES[1])?;
        for (i, row) in self.counts.iter().enumerate() {
            writeln!(f, "{:>14} {:>12} {:>12}", CLASS_NAMES[i], row[0], row[1])?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; N_CLASSES],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Undefined ratios (zero denominators) are reported as 0.0
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let total = confusion.total();

        let mut classes = [ClassMetrics::default(); N_CLASSES];
        for (class, metrics) in classes.iter_mut().enumerate() {
            let tp = confusion.true_positives(class) as f64;
            let precision = ratio(tp, confusion.predicted(class) as f64);
            let recall = ratio(tp, confusion.support(class) as f64);
            *metrics = ClassMetrics {
                precision,
                recall,
                f1: ratio(2.0 * precision * recall, precision + recall),
                support: confusion.support(class),
            };
        }

        let correct: u64 = (0..N_CLASSES).map(|c| confusion.true_positives(c)).sum();
        let accuracy = ratio(correct as f64, total as f64);

        // Macro average covers only labels seen in either y_true or y_pred
        let present: Vec<&ClassMetrics> = classes
            .iter()
            .enumerate()
            .filter(|&(c, _)| confusion.support(c) + confusion.predicted(c) > 0)
            .map(|(_, m)| m)
            .collect();
        let mean = |get: fn(&ClassMetrics) -> f64| {
            ratio(present.iter().map(|m| get(m)).sum::<f64>(), present.len() as f64)
        };
        let macro_avg = ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        };

        let weighted = |get: fn(&ClassMetrics) -> f64| {
            ratio(
                classes.iter().map(|m| get(m) * m.support as f64).sum::<f64>(),
                total as f64,
            )
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
            confusion,
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (name, m) in CLASS_NAMES.iter().zip(self.classes.iter()) {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", self.confusion)
    }
}
