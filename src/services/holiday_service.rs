use crate::models::Holiday;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Source of public holidays for a calendar year.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, String>;
}

/// BrasilAPI `/feriados/v1/{year}` client.
pub struct BrasilApiHolidays {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl BrasilApiHolidays {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl HolidaySource for BrasilApiHolidays {
    async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, String> {
        log::info!("📅 Fetching holidays for {}", year);

        let url = format!("{}/{}", self.base_url, year);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch holidays: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Holiday API error: {}", response.status()));
        }

        response
            .json::<Vec<Holiday>>()
            .await
            .map_err(|e| format!("Failed to parse holidays: {}", e))
    }
}

/// One year of holidays: the full list plus its set of `YYYY-MM-DD` dates.
#[derive(Debug)]
pub struct HolidayYear {
    pub holidays: Vec<Holiday>,
    dates: HashSet<String>,
}

impl HolidayYear {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        let dates = holidays.iter().map(|h| h.date.clone()).collect();
        Self { holidays, dates }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date.format("%Y-%m-%d").to_string())
    }
}

/// Holiday lookups backed by a per-year cache.
///
/// A year is fetched once, on first use, and kept for the life of the
/// process. Failed fetches are not cached.
pub struct HolidayCalendar {
    source: Arc<dyn HolidaySource>,
    cache: RwLock<HashMap<i32, Arc<HolidayYear>>>,
}

impl HolidayCalendar {
    pub fn new(source: Arc<dyn HolidaySource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cached(&self, year: i32) -> Option<Arc<HolidayYear>> {
        self.cache.read().ok()?.get(&year).cloned()
    }

    /// All holidays of `year`, from cache when possible.
    pub async fn year(&self, year: i32) -> Result<Arc<HolidayYear>, String> {
        if let Some(entry) = self.cached(year) {
            log::debug!("📦 Using cached holidays for {}", year);
            return Ok(entry);
        }

        let entry = Arc::new(HolidayYear::new(self.source.fetch_year(year).await?));

        // Concurrent first lookups may both land here; same data either way
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(year, entry.clone());
            log::debug!("💾 Cached {} holidays for {}", entry.holidays.len(), year);
        }

        Ok(entry)
    }

    pub async fn is_holiday(&self, date: NaiveDate) -> Result<bool, String> {
        use chrono::Datelike;

        Ok(self.year(date.year()).await?.contains(date))
    }

    pub fn cached_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .cache
            .read()
            .map(|c| c.keys().copied().collect())
            .unwrap_or_default();
        years.sort_unstable();
        years
    }
}
