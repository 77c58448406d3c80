//! Monthly album sales, shaped for a line plot.
//!
//! Records arrive as JSON (`{"month": "January", "year": 2020, "albumsSold": 120}`).
//! [`SalesSeries`] turns them into points on a month axis and exposes the
//! axis domains; the drawing is delegated to a [`SalesPlot`] implementation.

use serde::{Deserialize, Serialize};

use crate::Month;

/// One row of sales data as loaded by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSalesData {
    /// English full month name, e.g. `"March"`
    pub month: String,
    pub year: u16,
    pub albums_sold: u64,
}

/// A sales record whose month name has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesPoint {
    pub month: Month,
    pub year: u16,
    pub albums_sold: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SalesError {
    #[error("Unknown month name: {0:?}")]
    UnknownMonth(String),

    #[error("Plot container id is empty")]
    EmptyContainer,

    #[error("Invalid sales data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render album sales plot")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Sales points in record order, which is the order the line is drawn in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSeries {
    points: Vec<SalesPoint>,
}

impl SalesSeries {
    /// Resolves every record's month name.
    ///
    /// # Errors
    /// Returns `SalesError::UnknownMonth` for the first record whose month is
    /// not an English full month name.
    pub fn from_records(records: &[AlbumSalesData]) -> Result<Self, SalesError> {
        let points = records
            .iter()
            .map(|record| {
                let month = Month::from_name(&record.month).ok_or_else(|| {
                    tracing::debug!(month = %record.month, "unknown month name in sales data");
                    SalesError::UnknownMonth(record.month.clone())
                })?;
                Ok(SalesPoint {
                    month,
                    year: record.year,
                    albums_sold: record.albums_sold,
                })
            })
            .collect::<Result<Vec<_>, SalesError>>()?;

        tracing::trace!(points = points.len(), "built album sales series");
        Ok(Self { points })
    }

    /// Parses a JSON array of [`AlbumSalesData`] records.
    ///
    /// # Errors
    /// Returns `SalesError::Json` on malformed JSON, or any error of
    /// [`SalesSeries::from_records`].
    pub fn from_json(json: &str) -> Result<Self, SalesError> {
        let records: Vec<AlbumSalesData> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    pub fn points(&self) -> &[SalesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest and latest month in the series (the x-axis domain).
    pub fn month_extent(&self) -> Option<(Month, Month)> {
        let first = self.points.first()?.month;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.month), hi.max(p.month))
        }))
    }

    /// Largest monthly sales figure (the top of the y-axis), 0 when empty.
    pub fn max_albums_sold(&self) -> u64 {
        self.points
            .iter()
            .map(|p| p.albums_sold)
            .max()
            .unwrap_or(0)
    }
}

/// A rendering backend that draws a sales series into a named container.
pub trait SalesPlot {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Draws `series`, replacing whatever the container held before.
    ///
    /// # Errors
    /// Backend specific.
    fn render(&mut self, series: &SalesSeries, container_id: &str) -> Result<(), Self::Error>;
}

/// Builds a series from `data` and draws it into `container_id`.
///
/// # Errors
/// Returns `SalesError::EmptyContainer` for a blank container id, any error of
/// [`SalesSeries::from_records`], or `SalesError::Render` wrapping the
/// backend's failure.
pub fn generate_album_sales_plot<P: SalesPlot>(
    plot: &mut P,
    data: &[AlbumSalesData],
    container_id: &str,
) -> Result<(), SalesError> {
    if container_id.trim().is_empty() {
        return Err(SalesError::EmptyContainer);
    }
    let series = SalesSeries::from_records(data)?;
    plot.render(&series, container_id)
        .map_err(|e| SalesError::Render(Box::new(e)))
}
