// Chart rendering seam - the report only hands over numbers and a height

pub trait ChartRenderer: Send + Sync {
    /// Multi-line text plot of `series`, `height` rows tall
    fn plot(&self, series: &[f64], height: usize) -> String;
}
