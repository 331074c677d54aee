use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A footprint-area bucket: `lower <= area < upper`, or `lower <= area` when unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeClass {
    pub label: String,
    pub lower: f64,
    #[serde(default)]
    pub upper: Option<f64>,
    pub color: String,
}

impl SizeClass {
    pub fn new(label: &str, lower: f64, upper: Option<f64>, color: &str) -> Self {
        Self { label: label.to_string(), lower, upper, color: color.to_string() }
    }

    #[inline]
    pub fn contains(&self, area: f64) -> bool {
        area >= self.lower && self.upper.is_none_or(|upper| area < upper)
    }
}

/// Ordered size classes partitioning the footprint-area domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeClasses {
    classes: Vec<SizeClass>,
}

impl SizeClasses {
    /// Validate that classes are ascending, contiguous, uniquely labelled,
    /// and that exactly the last one is unbounded.
    pub fn new(classes: Vec<SizeClass>) -> Result<Self> {
        let Some(last) = classes.last() else { bail!("At least one size class is required") };
        if last.upper.is_some() {
            bail!("The last size class {:?} must be unbounded", last.label);
        }

        for (i, class) in classes.iter().enumerate() {
            if !class.lower.is_finite() {
                bail!("Size class {:?} has a non-finite lower bound", class.label);
            }
            if classes[..i].iter().any(|c| c.label == class.label) {
                bail!("Duplicate size class label {:?}", class.label);
            }
            if i + 1 == classes.len() { break }

            let Some(upper) = class.upper else {
                bail!("Only the last size class may be unbounded, found {:?}", class.label);
            };
            if !(upper > class.lower) {
                bail!("Size class {:?} is empty: [{}, {})", class.label, class.lower, upper);
            }
            let next = &classes[i + 1];
            if next.lower != upper {
                bail!("Size classes {:?} and {:?} are not contiguous ({} != {})",
                    class.label, next.label, upper, next.lower);
            }
        }

        Ok(Self { classes })
    }

    #[inline] pub fn iter(&self) -> std::slice::Iter<'_, SizeClass> { self.classes.iter() }

    #[inline] pub fn len(&self) -> usize { self.classes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.classes.is_empty() }

    pub fn get(&self, label: &str) -> Option<&SizeClass> {
        self.classes.iter().find(|c| c.label == label)
    }

    pub fn contains(&self, label: &str) -> bool { self.get(label).is_some() }

    pub fn labels(&self) -> impl Iterator<Item = &str> { self.classes.iter().map(|c| c.label.as_str()) }

    /// Index of the class an area falls into. Areas below the first lower bound
    /// (or NaN) belong to no class.
    pub fn classify(&self, area: f64) -> Option<usize> {
        self.classes.iter().position(|c| c.contains(area))
    }
}

impl Default for SizeClasses {
    fn default() -> Self {
        Self {
            classes: vec![
                SizeClass::new("Très petit", 0.0, Some(50.0), "#FFEB3B"),
                SizeClass::new("Petit", 50.0, Some(100.0), "#FFA726"),
                SizeClass::new("Moyen", 100.0, Some(200.0), "#EF5350"),
                SizeClass::new("Grand", 200.0, None, "#212121"),
            ],
        }
    }
}

impl<'a> IntoIterator for &'a SizeClasses {
    type Item = &'a SizeClass;
    type IntoIter = std::slice::Iter<'a, SizeClass>;
    fn into_iter(self) -> Self::IntoIter { self.classes.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classes_partition_the_domain() {
        let classes = SizeClasses::default();
        assert!(SizeClasses::new(classes.iter().cloned().collect()).is_ok());
        assert_eq!(classes.classify(0.0), Some(0));
        assert_eq!(classes.classify(49.99), Some(0));
        assert_eq!(classes.classify(50.0), Some(1));
        assert_eq!(classes.classify(199.9), Some(2));
        assert_eq!(classes.classify(200.0), Some(3));
        assert_eq!(classes.classify(1e9), Some(3));
        assert_eq!(classes.classify(-1.0), None);
        assert_eq!(classes.classify(f64::NAN), None);
    }

    #[test]
    fn gaps_and_overlaps_are_rejected() {
        let gap = vec![SizeClass::new("a", 0.0, Some(10.0), "#000"), SizeClass::new("b", 20.0, None, "#111")];
        assert!(SizeClasses::new(gap).is_err());

        let overlap = vec![SizeClass::new("a", 0.0, Some(10.0), "#000"), SizeClass::new("b", 5.0, None, "#111")];
        assert!(SizeClasses::new(overlap).is_err());
    }

    #[test]
    fn exactly_one_unbounded_class_last() {
        let bounded_last = vec![SizeClass::new("a", 0.0, Some(10.0), "#000")];
        assert!(SizeClasses::new(bounded_last).is_err());

        let early_unbounded = vec![SizeClass::new("a", 0.0, None, "#000"), SizeClass::new("b", 10.0, None, "#111")];
        assert!(SizeClasses::new(early_unbounded).is_err());

        assert!(SizeClasses::new(Vec::new()).is_err());
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let dup = vec![SizeClass::new("a", 0.0, Some(10.0), "#000"), SizeClass::new("a", 10.0, None, "#111")];
        assert!(SizeClasses::new(dup).is_err());
    }
}
