//! Aggregation view
//!
//! The second output view is a pivot over the consolidated table with the
//! units classification as its only column field. Row fields and value fields
//! are left for whoever consumes the workbook; the definition is committed
//! alongside a rendered grid of the column labels.

use crate::config::PipelineConfig;
use crate::constants::{PIVOT_BLANK_LABEL, PIVOT_COLUMN_LABELS, PIVOT_GRAND_TOTAL};
use crate::error::{QuantError, Result};
use crate::models::{Table, Value};
use polars::prelude::{Column, DataFrame, DataType, Expr, IntoLazy, col, len};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const GROUP_KEY: &str = "__group";
const GROUP_ROWS: &str = "__rows";

/// How a value field is summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Summarize {
    Count,
    Sum,
}

impl Summarize {
    fn label(&self) -> &'static str {
        match self {
            Summarize::Count => "Count",
            Summarize::Sum => "Sum",
        }
    }
}

/// A value field of the pivot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub source: String,
    pub summarize: Summarize,
}

impl DataField {
    pub fn caption(&self) -> String {
        format!("{} of {}", self.summarize.label(), self.source)
    }
}

/// Definition of the aggregation view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotView {
    pub name: String,
    pub source_view: String,
    pub column_fields: Vec<String>,
    pub row_fields: Vec<String>,
    pub data_fields: Vec<DataField>,
    pub show_row_grand_totals: bool,
}

/// One column label of the pivot with its aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct PivotGroup {
    pub label: String,
    pub rows: usize,
    pub values: Vec<f64>,
}

/// The pivot every run produces: units across the columns, nothing else
pub fn build_pivot(config: &PipelineConfig) -> PivotView {
    let pivot = PivotView {
        name: config.pivot_view.clone(),
        source_view: config.quantifications_view.clone(),
        column_fields: vec![config.units_header.clone()],
        row_fields: Vec::new(),
        data_fields: Vec::new(),
        show_row_grand_totals: false,
    };
    debug!("Pivot definition: {:?}", pivot);
    pivot
}

impl PivotView {
    pub fn with_data_field(mut self, source: impl Into<String>, summarize: Summarize) -> Self {
        self.data_fields.push(DataField {
            source: source.into(),
            summarize,
        });
        self
    }

    /// The single column field this view groups by
    fn column_field(&self) -> Result<&str> {
        match (self.column_fields.as_slice(), self.row_fields.is_empty()) {
            ([field], true) => Ok(field),
            _ => Err(QuantError::Configuration {
                message: format!(
                    "Pivot '{}' needs exactly one column field and no row fields to render",
                    self.name
                ),
            }),
        }
    }

    /// Aggregate the source table by the column field
    pub fn groups(&self, table: &Table) -> Result<Vec<PivotGroup>> {
        let field = self.column_field()?;
        let key_index = source_column(table, field)?;

        let mut columns = vec![Column::new(GROUP_KEY.into(), text_column(table, key_index))];
        let mut aggregations: Vec<Expr> = vec![len().alias(GROUP_ROWS)];

        for (position, data_field) in self.data_fields.iter().enumerate() {
            let source_index = source_column(table, &data_field.source)?;
            let input = format!("__field{}", position);
            let output = format!("__value{}", position);

            columns.push(Column::new(input.as_str().into(), text_column(table, source_index)));
            let expr = match data_field.summarize {
                Summarize::Count => col(input.as_str()).count(),
                Summarize::Sum => col(input.as_str()).cast(DataType::Float64).sum(),
            };
            aggregations.push(expr.alias(output.as_str()));
        }

        let frame = DataFrame::new(columns)?;
        let grouped = frame
            .lazy()
            .group_by([col(GROUP_KEY)])
            .agg(aggregations)
            .collect()?;

        let labels = grouped
            .column(GROUP_KEY)?
            .as_materialized_series()
            .str()?
            .clone();
        let row_counts = grouped.column(GROUP_ROWS)?.cast(&DataType::Float64)?;
        let rows = row_counts.as_materialized_series().f64()?;

        let mut value_columns = Vec::with_capacity(self.data_fields.len());
        for position in 0..self.data_fields.len() {
            let values = grouped
                .column(format!("__value{}", position).as_str())?
                .cast(&DataType::Float64)?;
            value_columns.push(values.as_materialized_series().f64()?.clone());
        }

        let mut groups: Vec<PivotGroup> = (0..grouped.height())
            .map(|index| PivotGroup {
                label: labels
                    .get(index)
                    .unwrap_or(PIVOT_BLANK_LABEL)
                    .to_string(),
                rows: rows.get(index).unwrap_or(0.0) as usize,
                values: value_columns
                    .iter()
                    .map(|values| values.get(index).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        groups.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.label.cmp(&b.label))
        });

        info!(
            "Pivot '{}': {} column labels over {} rows",
            self.name,
            groups.len(),
            table.row_count()
        );

        Ok(groups)
    }

    /// Lay the pivot out as a grid: a caption row, the column labels, then one
    /// row per value field
    pub fn render(&self, table: &Table) -> Result<Table> {
        let groups = self.groups(table)?;
        let width = 1 + groups.len() + usize::from(self.show_row_grand_totals);

        let mut caption = vec![String::new(); width];
        if width > 1 {
            caption[1] = PIVOT_COLUMN_LABELS.to_string();
        }

        let mut label_row = vec![Value::Blank];
        label_row.extend(groups.iter().map(|group| Value::Text(group.label.clone())));
        if self.show_row_grand_totals {
            label_row.push(Value::Text(PIVOT_GRAND_TOTAL.to_string()));
        }

        let mut rows = vec![label_row];
        for (position, data_field) in self.data_fields.iter().enumerate() {
            let mut row = vec![Value::Text(data_field.caption())];
            row.extend(groups.iter().map(|group| Value::Number(group.values[position])));
            if self.show_row_grand_totals {
                row.push(Value::Number(
                    groups.iter().map(|group| group.values[position]).sum(),
                ));
            }
            rows.push(row);
        }

        Ok(Table::new(caption, rows))
    }
}

fn source_column(table: &Table, header: &str) -> Result<usize> {
    table
        .column_index(header)
        .ok_or_else(|| QuantError::Configuration {
            message: format!("Pivot source column '{}' not found", header),
        })
}

fn text_column(table: &Table, column: usize) -> Vec<Option<String>> {
    table
        .column_values(column)
        .map(|value| {
            if value.is_blank() {
                None
            } else {
                Some(value.to_string())
            }
        })
        .collect()
}
