//! Client for the Tabelog search API.
//!
//! Request URLs are built by `*_url` methods and bodies are read by the
//! `parse_*` functions, so both halves can be checked without a server.
//!
//! The API answers "nothing found" and "bad request" the same way: a zero
//! `NumOfResult`. A zero count is therefore always re-read as an error
//! envelope and reported as [`ApiError`], never as an empty page.

use crate::data::{Restaurant, Review, SearchResult};
use crate::db::Record;
use crate::encode::{percent_encode_with, Utf8Boundary};
use crate::error::{ApiError, Result};
use crate::http::HttpClient;
use crate::xml::{parse_document, Element};

pub const DEFAULT_API_BASE: &str = "http://api.tabelog.com";

const RESTAURANT_SEARCH: &str = "/Ver2.1/RestaurantSearch/";
const REVIEW_SEARCH: &str = "/Ver1/ReviewSearch/";

#[derive(Debug, Clone)]
pub struct TabelogClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    boundary: Utf8Boundary,
}

impl TabelogClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            boundary: Utf8Boundary::default(),
        }
    }

    /// Pick how station names are escaped, see [`crate::encode`].
    pub fn with_boundary(mut self, boundary: Utf8Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn restaurants_url(&self, station: &str, page: u32) -> String {
        format!(
            "{}{RESTAURANT_SEARCH}?Key={}&PageNum={page}&ResultSet=large&Station={}",
            self.base_url,
            self.api_key,
            percent_encode_with(station, self.boundary)
        )
    }

    pub fn reviews_url(&self, rcd: i64) -> String {
        format!(
            "{}{REVIEW_SEARCH}?Key={}&Rcd={rcd}",
            self.base_url, self.api_key
        )
    }

    /// One page of restaurants near `station`.
    pub async fn fetch_restaurants(
        &self,
        station: &str,
        page: u32,
    ) -> Result<SearchResult<Restaurant>> {
        let body = self.http.get(&self.restaurants_url(station, page)).await?;
        let result = parse_restaurants(&body)?;
        tracing::debug!(station, page, total = result.num_of_result, "fetched restaurants");
        Ok(result)
    }

    pub async fn fetch_reviews(&self, rcd: i64) -> Result<SearchResult<Review>> {
        let body = self.http.get(&self.reviews_url(rcd)).await?;
        let result = parse_reviews(&body)?;
        tracing::debug!(rcd, total = result.num_of_result, "fetched reviews");
        Ok(result)
    }
}

pub fn parse_restaurants(body: &[u8]) -> Result<SearchResult<Restaurant>, ApiError> {
    parse_search(body)
}

pub fn parse_reviews(body: &[u8]) -> Result<SearchResult<Review>, ApiError> {
    parse_search(body)
}

fn parse_search<T: Record>(body: &[u8]) -> Result<SearchResult<T>, ApiError> {
    let root = parse_document(body)?;
    let num_of_result = match root.child("NumOfResult") {
        Some(count) => parse_count(&count.text)?,
        None => 0,
    };
    if num_of_result == 0 {
        return Err(parse_error(&root));
    }

    let mut items = Vec::new();
    for item in root.children_named("Item") {
        let mut record = T::default();
        for field in &item.children {
            record.set(&field.name, &field.text)?;
        }
        items.push(record);
    }
    Ok(SearchResult {
        num_of_result,
        items,
    })
}

fn parse_count(text: &str) -> Result<u32, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| ApiError::InvalidValue {
        element: "NumOfResult".to_string(),
        value: text.to_string(),
    })
}

/// The same document read as an error envelope: its `Message` element.
fn parse_error(root: &Element) -> ApiError {
    match root.child("Message") {
        Some(message) if !message.text.is_empty() => ApiError::Message(message.text.clone()),
        _ => ApiError::NoResults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TWO_RESTAURANTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<RestaurantInfo>
  <NumOfResult>2</NumOfResult>
  <Item>
    <Rcd>13001234</Rcd>
    <RestaurantName>麺屋 武蔵</RestaurantName>
    <TabelogUrl>http://r.tabelog.com/tokyo/A1304/A130401/13001234/</TabelogUrl>
    <TotalScore>3.81</TotalScore>
    <Category>ラーメン</Category>
    <Station>新宿</Station>
    <Holiday></Holiday>
    <Latitude>35.6938</Latitude>
    <Longitude>139.7034</Longitude>
  </Item>
  <Item>
    <Rcd>13005678</Rcd>
    <RestaurantName>Cafe &amp; Bar</RestaurantName>
    <TotalScore>3.50</TotalScore>
  </Item>
</RestaurantInfo>"#;

    const INVALID_KEY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Error>
  <Message>Invalid Key</Message>
</Error>"#;

    fn client(base: &str) -> TabelogClient {
        TabelogClient::new(HttpClient::new().unwrap(), base, "secret")
    }

    #[test]
    fn restaurants_url_has_all_parameters() {
        let url = client("http://api.tabelog.com/").restaurants_url("新宿", 3);
        assert_eq!(
            url,
            "http://api.tabelog.com/Ver2.1/RestaurantSearch/?Key=secret&PageNum=3&ResultSet=large&Station=%E6%96%B0%E5%AE%BF"
        );
    }

    #[test]
    fn reviews_url_uses_rcd() {
        let url = client(DEFAULT_API_BASE).reviews_url(13001234);
        assert_eq!(url, "http://api.tabelog.com/Ver1/ReviewSearch/?Key=secret&Rcd=13001234");
    }

    #[test]
    fn station_escaping_follows_boundary() {
        let legacy = client(DEFAULT_API_BASE).restaurants_url("\u{1F35C}", 1);
        assert!(legacy.ends_with("Station=%FF%8D%9C"));
        let standard = client(DEFAULT_API_BASE)
            .with_boundary(Utf8Boundary::Standard)
            .restaurants_url("\u{1F35C}", 1);
        assert!(standard.ends_with("Station=%F0%9F%8D%9C"));
    }

    #[test]
    fn parse_restaurants_keeps_document_order() {
        let result = parse_restaurants(TWO_RESTAURANTS.as_bytes()).unwrap();
        assert_eq!(result.num_of_result, 2);
        assert!(!result.is_empty());
        assert_eq!(result.len(), 2);

        let first = &result.items[0];
        assert_eq!(first.rcd, 13001234);
        assert_eq!(first.restaurant_name, "麺屋 武蔵");
        assert_eq!(first.total_score, "3.81");
        assert_eq!(first.latitude, "35.6938");
        assert_eq!(first.holiday, "");
        assert_eq!(first.tel, "");

        let second = &result.items[1];
        assert_eq!(second.rcd, 13005678);
        assert_eq!(second.restaurant_name, "Cafe & Bar");
        assert_eq!(second.total_score, "3.50");
    }

    #[test]
    fn zero_results_surface_the_message() {
        let err = parse_restaurants(INVALID_KEY.as_bytes()).unwrap_err();
        assert!(matches!(&err, ApiError::Message(m) if m == "Invalid Key"));
    }

    #[test]
    fn zero_results_without_message() {
        let body = "<ReviewInfo><NumOfResult>0</NumOfResult></ReviewInfo>";
        let err = parse_reviews(body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::NoResults));
    }

    #[test]
    fn broken_xml_is_malformed() {
        let err = parse_reviews(b"<ReviewInfo><NumOfResult>1</NumOf").unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_) | ApiError::Incomplete));

        let err = parse_reviews(b"<ReviewInfo><NumOfResult>1</Count></ReviewInfo>").unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = parse_restaurants(b"<RestaurantInfo><NumOfResult>many</NumOfResult></RestaurantInfo>")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidValue { ref element, .. } if element == "NumOfResult"));

        let body = "<RestaurantInfo><NumOfResult>1</NumOfResult><Item><Rcd>abc</Rcd></Item></RestaurantInfo>";
        let err = parse_restaurants(body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidValue { ref value, .. } if value == "abc"));
    }

    #[test]
    fn element_text_is_not_trimmed() {
        let body = "<RestaurantInfo>
  <NumOfResult> 1 </NumOfResult>
  <Item>
    <Rcd>
      13001234
    </Rcd>
    <Address>  東京都 新宿区  </Address>
    <BusinessHours>
11:00-23:00
</BusinessHours>
    <Holiday> </Holiday>
  </Item>
</RestaurantInfo>";
        let result = parse_restaurants(body.as_bytes()).unwrap();
        let restaurant = &result.items[0];
        assert_eq!(restaurant.rcd, 13001234);
        assert_eq!(restaurant.address, "  東京都 新宿区  ");
        assert_eq!(restaurant.business_hours, "\n11:00-23:00\n");
        assert_eq!(restaurant.holiday, " ");

        let body = "<ReviewInfo><NumOfResult>1</NumOfResult><Item>\
            <Comment>\n  スープが濃い。\n  また来たい  </Comment></Item></ReviewInfo>";
        let review = &parse_reviews(body.as_bytes()).unwrap().items[0];
        assert_eq!(review.comment, "\n  スープが濃い。\n  また来たい  ");
    }

    #[test]
    fn parse_reviews_reads_all_fields() {
        let body = r#"<ReviewInfo>
  <NumOfResult>1</NumOfResult>
  <Item>
    <NickName>ramen_fan</NickName>
    <VisitDate>2010-05-01</VisitDate>
    <ReviewDate>2010-05-03</ReviewDate>
    <UseType>夜のみ</UseType>
    <Situations>一人で</Situations>
    <TotalScore>4.0</TotalScore>
    <TasteScore>4.5</TasteScore>
    <ServiceScore>3.5</ServiceScore>
    <MoodScore>3.0</MoodScore>
    <DinnerPrice>￥1,000～￥1,999</DinnerPrice>
    <LunchPrice></LunchPrice>
    <Title>濃厚つけ麺</Title>
    <Comment>スープが濃い</Comment>
    <PcSiteUrl>http://r.tabelog.com/rvwr/1/</PcSiteUrl>
    <MobileSiteUrl>http://k.tabelog.com/rvwr/1/</MobileSiteUrl>
  </Item>
</ReviewInfo>"#;
        let result = parse_reviews(body.as_bytes()).unwrap();
        let review = &result.items[0];
        assert_eq!(review.nick_name, "ramen_fan");
        assert_eq!(review.use_type, "夜のみ");
        assert_eq!(review.dinner_price, "￥1,000～￥1,999");
        assert_eq!(review.lunch_price, "");
        assert_eq!(review.title, "濃厚つけ麺");
        assert_eq!(review.mobile_site_url, "http://k.tabelog.com/rvwr/1/");
    }

    #[tokio::test]
    async fn fetch_restaurants_reports_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Ver2.1/RestaurantSearch/"))
            .and(query_param("Key", "secret"))
            .and(query_param("PageNum", "1"))
            .and(query_param("ResultSet", "large"))
            .and(query_param("Station", "新宿"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INVALID_KEY))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .fetch_restaurants("新宿", 1)
            .await
            .unwrap_err();
        match err {
            Error::Api(ApiError::Message(message)) => assert_eq!(message, "Invalid Key"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_restaurants_returns_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Ver2.1/RestaurantSearch/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TWO_RESTAURANTS))
            .mount(&server)
            .await;

        let result = client(&server.uri()).fetch_restaurants("新宿", 1).await.unwrap();
        let names: Vec<_> = result.into_iter().map(|r| r.restaurant_name).collect();
        assert_eq!(names, ["麺屋 武蔵", "Cafe & Bar"]);
    }

    #[tokio::test]
    async fn fetch_reviews_sends_rcd() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Ver1/ReviewSearch/"))
            .and(query_param("Rcd", "13001234"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ReviewInfo><NumOfResult>1</NumOfResult><Item><Title>旨い</Title></Item></ReviewInfo>",
            ))
            .mount(&server)
            .await;

        let result = client(&server.uri()).fetch_reviews(13001234).await.unwrap();
        assert_eq!(result.items[0].title, "旨い");
    }
}
