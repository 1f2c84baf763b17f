use crate::db::record;

record! {
    /// A restaurant as returned by `RestaurantSearch`. Scores, prices and
    /// coordinates stay exactly as the API wrote them.
    pub struct Restaurant in "restaurants" {
        rcd: i64 => "Rcd",
        restaurant_name: String => "RestaurantName",
        /// detail page (PC)
        tabelog_url: String => "TabelogUrl",
        /// detail page (mobile)
        tabelog_mobile_url: String => "TabelogMobileUrl",
        total_score: String => "TotalScore",
        taste_score: String => "TasteScore",
        service_score: String => "ServiceScore",
        mood_score: String => "MoodScore",
        situation: String => "Situation",
        dinner_price: String => "DinnerPrice",
        lunch_price: String => "LunchPrice",
        category: String => "Category",
        /// nearest station
        station: String => "Station",
        address: String => "Address",
        tel: String => "Tel",
        business_hours: String => "BusinessHours",
        holiday: String => "Holiday",
        latitude: String => "Latitude",
        longitude: String => "Longitude",
    }
}

record! {
    /// A review as returned by `ReviewSearch`. It does not carry the id of
    /// its restaurant.
    pub struct Review in "reviews" {
        nick_name: String => "NickName",
        visit_date: String => "VisitDate",
        review_date: String => "ReviewDate",
        /// dinner, lunch or both
        use_type: String => "UseType",
        situations: String => "Situations",
        total_score: String => "TotalScore",
        taste_score: String => "TasteScore",
        service_score: String => "ServiceScore",
        mood_score: String => "MoodScore",
        dinner_price: String => "DinnerPrice",
        lunch_price: String => "LunchPrice",
        title: String => "Title",
        /// first 99 characters only, cut by the API
        comment: String => "Comment",
        pc_site_url: String => "PcSiteUrl",
        mobile_site_url: String => "MobileSiteUrl",
    }
}

/// Search response envelope (`NumOfResult` plus repeated `Item`s).
///
/// A zero `num_of_result` never comes with items; the body is an error
/// envelope instead, see [`crate::api`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult<T> {
    pub num_of_result: u32,
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for SearchResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
