//! Rendering of typed heatmap queries into parameterized ClickHouse SQL.
//!
//! Every value that originates from a request becomes a `?` placeholder
//! with a matching entry in [`SqlQuery::params`]; the clickhouse crate
//! escapes it when binding. Only fixed identifiers and keywords are written
//! into the query text.

use crate::schema::{CLICKS_TABLE, METADATA_TABLE};
use clickhouse::query::Query;
use clickhouse::Client;
use heatmap_core::{
    PagesQuery, PathMatch, PointsQuery, Predicate, StatsQuery, TableAlias, TimePredicate,
    TimeWindow, WidthRange,
};
use serde::Serialize;

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    UInt(u64),
    Text(String),
}

/// Query text plus its parameters, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlQuery {
    sql: String,
    params: Vec<SqlParam>,
}

impl SqlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    fn bind(&mut self, param: SqlParam) -> &mut Self {
        self.sql.push('?');
        self.params.push(param);
        self
    }

    /// Build a clickhouse query with all parameters bound.
    pub fn bind_to(self, client: &Client) -> Query {
        self.params
            .into_iter()
            .fold(client.query(&self.sql), |query, param| query.bind(param))
    }
}

/// Escape LIKE metacharacters so the value matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_from(sql: &mut SqlQuery) {
    sql.push(" FROM ")
        .push(CLICKS_TABLE)
        .push(" AS ")
        .push(TableAlias::Clicks.as_str())
        .push(" INNER JOIN ")
        .push(METADATA_TABLE)
        .push(" AS ")
        .push(TableAlias::Metadata.as_str())
        .push(" ON src.session_id = srm.session_id AND src.site_id = srm.site_id");
}

fn push_where(sql: &mut SqlQuery, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        sql.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(sql, predicate);
    }
}

fn push_predicate(sql: &mut SqlQuery, predicate: &Predicate) {
    match predicate {
        Predicate::Site(site_id) => {
            sql.push("src.site_id = ").bind(SqlParam::UInt(u64::from(*site_id)));
        }
        Predicate::PositiveViewport => {
            sql.push("src.viewport_width > 0 AND src.viewport_height > 0");
        }
        Predicate::WithinViewport => {
            sql.push(
                "src.x >= 0 AND src.y >= 0 \
                 AND src.x <= src.viewport_width AND src.y <= src.viewport_height",
            );
        }
        Predicate::ViewportWidth(range) => push_width_range(sql, range),
        Predicate::PageUrl(PathMatch::Exact(path)) => {
            sql.push("srm.page_url = ").bind(SqlParam::Text(path.clone()));
        }
        Predicate::PageUrl(PathMatch::Contains(fragment)) => {
            sql.push("srm.page_url LIKE ")
                .bind(SqlParam::Text(format!("%{}%", escape_like(fragment))));
        }
        Predicate::Time(time) => push_time(sql, time),
    }
}

fn push_width_range(sql: &mut SqlQuery, range: &WidthRange) {
    match (range.min, range.max) {
        (Some(min), Some(max)) => {
            sql.push("src.viewport_width >= ")
                .bind(SqlParam::UInt(u64::from(min)))
                .push(" AND src.viewport_width <= ")
                .bind(SqlParam::UInt(u64::from(max)));
        }
        (Some(min), None) => {
            sql.push("src.viewport_width >= ").bind(SqlParam::UInt(u64::from(min)));
        }
        (None, Some(max)) => {
            sql.push("src.viewport_width <= ").bind(SqlParam::UInt(u64::from(max)));
        }
        (None, None) => {
            sql.push("1");
        }
    }
}

fn push_time(sql: &mut SqlQuery, time: &TimePredicate) {
    let column = time.column().to_string();
    match time.window() {
        TimeWindow::Days {
            start,
            end_exclusive,
            time_zone,
        } => {
            sql.push(&column)
                .push(" >= toDateTime(")
                .bind(SqlParam::Text(format!("{} 00:00:00", start)))
                .push(", ")
                .bind(SqlParam::Text(time_zone.clone()))
                .push(") AND ")
                .push(&column)
                .push(" < toDateTime(")
                .bind(SqlParam::Text(format!("{} 00:00:00", end_exclusive)))
                .push(", ")
                .bind(SqlParam::Text(time_zone.clone()))
                .push(")");
        }
        TimeWindow::PastMinutes { start, end } => {
            sql.push(&column)
                .push(" > now() - toIntervalMinute(")
                .bind(SqlParam::UInt(u64::from(*start)))
                .push(") AND ")
                .push(&column)
                .push(" <= now() - toIntervalMinute(")
                .bind(SqlParam::UInt(u64::from(*end)))
                .push(")");
        }
    }
}

/// Bucketed click counts.
pub fn points_sql(query: &PointsQuery) -> SqlQuery {
    let grid = u64::from(query.grid_resolution);
    let mut sql = SqlQuery::new();

    sql.push("SELECT toUInt32(round(src.x / src.viewport_width * ")
        .bind(SqlParam::UInt(grid))
        .push(")) AS bucket_x, toUInt32(round(src.y / src.viewport_height * ")
        .bind(SqlParam::UInt(grid))
        .push(")) AS bucket_y, count() AS value");
    push_from(&mut sql);
    push_where(&mut sql, &query.predicates);
    sql.push(" GROUP BY bucket_x, bucket_y HAVING value >= ")
        .bind(SqlParam::UInt(query.min_value))
        .push(" ORDER BY value DESC, bucket_x ASC, bucket_y ASC LIMIT ")
        .bind(SqlParam::UInt(query.limit as u64));

    sql
}

/// Unbucketed totals.
pub fn stats_sql(query: &StatsQuery) -> SqlQuery {
    let mut sql = SqlQuery::new();

    sql.push("SELECT count() AS total_clicks, count(DISTINCT src.session_id) AS unique_sessions");
    push_from(&mut sql);
    push_where(&mut sql, &query.predicates);

    sql
}

/// Click volume per page path.
///
/// Absolute URLs go through `path()`; bare paths only lose their query
/// string and fragment. An empty result in either case ranks as `/`.
pub fn pages_sql(query: &PagesQuery) -> SqlQuery {
    let mut sql = SqlQuery::new();

    sql.push(
        "SELECT if((multiIf(\
            position(srm.page_url, '://') = 0, cutQueryStringAndFragment(srm.page_url), \
            path(srm.page_url)) AS raw_path) = '', '/', raw_path) AS pathname, \
         count() AS click_count, \
         count(DISTINCT src.session_id) AS session_count",
    );
    push_from(&mut sql);
    push_where(&mut sql, &query.predicates);
    sql.push(" GROUP BY pathname ORDER BY click_count DESC, pathname ASC LIMIT ")
        .bind(SqlParam::UInt(u64::from(query.limit)));

    sql
}
