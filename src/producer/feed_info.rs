use crate::config::FeedInfoConfig;
use crate::objects::FeedInfo;
use chrono::NaiveDate;

pub fn produce_feed_info(
    config: &FeedInfoConfig,
    validity_period: Option<(NaiveDate, NaiveDate)>,
) -> FeedInfo {
    FeedInfo {
        name: config.publisher_name.clone(),
        url: config.publisher_url.clone(),
        lang: config.lang.clone(),
        start_date: validity_period.map(|(start, _)| start),
        end_date: validity_period.map(|(_, end)| end),
        version: config.version.clone(),
    }
}
