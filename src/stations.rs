use serde::Serialize;

/// A WSR-88D site. Coordinates are WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "state")]
    pub region: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn station(
    id: &'static str,
    name: &'static str,
    region: &'static str,
    lat: f64,
    lon: f64,
) -> Station {
    Station {
        id,
        name,
        region,
        lat,
        lon,
    }
}

pub static STATIONS: &[Station] = &[
    station("KABR", "Aberdeen", "South Dakota", 45.4558, -98.4132),
    station("KABX", "Albuquerque", "New Mexico", 35.1497, -106.8244),
    station("KAKQ", "Norfolk/Wakefield", "Virginia", 36.9840, -77.0074),
    station("KAMA", "Amarillo", "Texas", 35.2333, -101.7092),
    station("KAMX", "Miami", "Florida", 25.6111, -80.4128),
    station("KAPX", "Gaylord", "Michigan", 44.9067, -84.7197),
    station("KARX", "La Crosse", "Wisconsin", 43.8228, -91.1914),
    station("KATX", "Seattle/Tacoma", "Washington", 48.1947, -122.4958),
    station("KBBX", "Beale AFB", "California", 39.4961, -121.6317),
    station("KBGM", "Binghamton", "New York", 42.1997, -75.9847),
    station("KBHX", "Eureka", "California", 40.4986, -124.2919),
    station("KBIS", "Bismarck", "North Dakota", 46.7708, -100.7603),
    station("KBLX", "Billings", "Montana", 45.8536, -108.6061),
    station("KBMX", "Birmingham", "Alabama", 33.1722, -86.7697),
    station("KBOX", "Boston", "Massachusetts", 41.9556, -71.1367),
    station("KBRO", "Brownsville", "Texas", 25.9161, -97.4189),
    station("KBUF", "Buffalo", "New York", 42.9489, -78.7369),
    station("KBYX", "Key West", "Florida", 24.5975, -81.7031),
    station("KCAE", "Columbia", "South Carolina", 33.9489, -81.1186),
    station("KCBW", "Houlton", "Maine", 46.0392, -67.8067),
    station("KCBX", "Boise", "Idaho", 43.4906, -116.2356),
    station("KCCX", "State College", "Pennsylvania", 40.9231, -78.0036),
    station("KCLE", "Cleveland", "Ohio", 41.4133, -81.8597),
    station("KCLX", "Charleston", "South Carolina", 32.6556, -81.0422),
    station("KCRP", "Corpus Christi", "Texas", 27.7842, -97.5111),
    station("KCXX", "Burlington", "Vermont", 44.5111, -73.1667),
    station("KCYS", "Cheyenne", "Wyoming", 41.1519, -104.8061),
    station("KDAX", "Sacramento", "California", 38.5011, -121.6778),
    station("KDDC", "Dodge City", "Kansas", 37.7608, -99.9689),
    station("KDFX", "Laughlin AFB", "Texas", 29.2731, -100.2803),
    station("KDGX", "Jackson", "Mississippi", 32.2803, -89.9844),
    station("KDIX", "Philadelphia", "New Jersey", 39.9469, -74.4111),
    station("KDLH", "Duluth", "Minnesota", 46.8369, -92.2097),
    station("KDMX", "Des Moines", "Iowa", 41.7311, -93.7231),
    station("KDOX", "Dover AFB", "Delaware", 38.8256, -75.4400),
    station("KDTX", "Detroit", "Michigan", 42.6997, -83.4717),
    station("KDVN", "Davenport", "Iowa", 41.6117, -90.5808),
    station("KEAX", "Kansas City", "Missouri", 38.8103, -94.2644),
    station("KEMX", "Tucson", "Arizona", 31.8936, -110.6300),
    station("KENX", "Albany", "New York", 42.5864, -74.0639),
    station("KEOX", "Fort Rucker", "Alabama", 31.4606, -85.4594),
    station("KEPZ", "El Paso", "Texas", 31.8731, -106.6978),
    station("KESX", "Las Vegas", "Nevada", 35.7011, -114.8919),
    station("KEVX", "Eglin AFB", "Florida", 30.5644, -85.9214),
    station("KEWX", "Austin/San Antonio", "Texas", 29.7039, -98.0283),
    station("KEYX", "Edwards AFB", "California", 35.0978, -117.5606),
    station("KFCX", "Roanoke", "Virginia", 37.0242, -80.2742),
    station("KFDR", "Altus AFB", "Oklahoma", 34.3622, -98.9761),
    station("KFDX", "Cannon AFB", "New Mexico", 34.6347, -103.6186),
    station("KFFC", "Atlanta", "Georgia", 33.3636, -84.5658),
    station("KFSD", "Sioux Falls", "South Dakota", 43.5878, -96.7289),
    station("KFSX", "Flagstaff", "Arizona", 34.5744, -111.1983),
    station("KFTG", "Denver", "Colorado", 39.7867, -104.5458),
    station("KFWS", "Dallas/Fort Worth", "Texas", 32.5731, -97.3031),
    station("KGGW", "Glasgow", "Montana", 48.2064, -106.6250),
    station("KGJX", "Grand Junction", "Colorado", 39.0619, -108.2139),
    station("KGLD", "Goodland", "Kansas", 39.3667, -101.7000),
    station("KGRB", "Green Bay", "Wisconsin", 44.4986, -88.1117),
    station("KGRK", "Fort Hood", "Texas", 30.7217, -97.3831),
    station("KGRR", "Grand Rapids", "Michigan", 42.8939, -85.5447),
    station("KGSP", "Greer", "South Carolina", 34.8833, -82.2200),
    station("KGWX", "Columbus AFB", "Mississippi", 33.8967, -88.3292),
    station("KGYX", "Portland", "Maine", 43.8914, -70.2564),
    station("KHDX", "Holloman AFB", "New Mexico", 33.0786, -106.1222),
    station("KHGX", "Houston/Galveston", "Texas", 29.4719, -95.0792),
    station("KHNX", "San Joaquin Valley", "California", 36.3142, -119.6322),
    station("KHPX", "Fort Campbell", "Kentucky", 36.7367, -87.2856),
    station("KHTX", "Huntsville", "Alabama", 34.9306, -86.0836),
    station("KICT", "Wichita", "Kansas", 37.6544, -97.4431),
    station("KILX", "Lincoln", "Illinois", 40.1506, -89.3367),
    station("KIND", "Indianapolis", "Indiana", 39.7075, -86.2803),
    station("KINX", "Tulsa", "Oklahoma", 36.1750, -95.5644),
    station("KIWA", "Phoenix", "Arizona", 33.2892, -111.6700),
    station("KIWX", "North Webster", "Indiana", 41.3586, -85.7000),
    station("KJAX", "Jacksonville", "Florida", 30.4847, -81.7019),
    station("KJGX", "Robins AFB", "Georgia", 32.6750, -83.3511),
    station("KJKL", "Jackson", "Kentucky", 37.5906, -83.3131),
    station("KLBB", "Lubbock", "Texas", 33.6539, -101.8142),
    station("KLCH", "Lake Charles", "Louisiana", 30.1253, -93.2158),
    station("KLIX", "New Orleans", "Louisiana", 30.3367, -89.8256),
    station("KLNX", "North Platte", "Nebraska", 41.9581, -100.5758),
    station("KLOT", "Chicago", "Illinois", 41.6044, -88.0844),
    station("KLRX", "Elko", "Nevada", 40.7397, -116.8028),
    station("KLSX", "St. Louis", "Missouri", 38.6989, -90.6828),
    station("KLTX", "Wilmington", "North Carolina", 33.9892, -78.4292),
    station("KLVX", "Louisville", "Kentucky", 37.9753, -85.9436),
    station("KLWX", "Sterling", "Virginia", 38.9754, -77.4778),
    station("KLZK", "Little Rock", "Arkansas", 34.8364, -92.2622),
    station("KMAF", "Midland/Odessa", "Texas", 31.9433, -102.1892),
    station("KMAX", "Medford", "Oregon", 42.0811, -122.7175),
    station("KMBX", "Minot AFB", "North Dakota", 48.3925, -100.8644),
    station("KMHX", "Morehead City", "North Carolina", 34.7756, -76.8761),
    station("KMKX", "Milwaukee", "Wisconsin", 42.9678, -88.5506),
    station("KMLB", "Melbourne", "Florida", 28.1133, -80.6542),
    station("KMOB", "Mobile", "Alabama", 30.6794, -88.2397),
    station("KMPX", "Minneapolis/St. Paul", "Minnesota", 44.8489, -93.5653),
    station("KMQT", "Marquette", "Michigan", 46.5311, -87.5486),
    station("KMRX", "Knoxville/Tri-Cities", "Tennessee", 36.1686, -83.4017),
    station("KMSX", "Missoula", "Montana", 47.0414, -113.9864),
    station("KMTX", "Salt Lake City", "Utah", 41.2628, -112.4453),
    station("KMUX", "San Francisco", "California", 37.1553, -121.8981),
    station("KMVX", "Grand Forks", "North Dakota", 47.5281, -97.3256),
    station("KMXX", "Maxwell AFB", "Alabama", 32.5367, -85.7897),
    station("KNKX", "San Diego", "California", 32.9189, -117.0419),
    station("KNQA", "Millington", "Tennessee", 35.3447, -89.8736),
    station("KOAX", "Omaha", "Nebraska", 41.3203, -96.3667),
    station("KOHX", "Nashville", "Tennessee", 36.2472, -86.5625),
    station("KOKX", "New York City", "New York", 40.8656, -72.8644),
    station("KOTX", "Spokane", "Washington", 47.6803, -117.6267),
    station("KPAH", "Paducah", "Kentucky", 37.0683, -88.7719),
    station("KPBZ", "Pittsburgh", "Pennsylvania", 40.5317, -80.2178),
    station("KPDT", "Pendleton", "Oregon", 45.6906, -118.8528),
    station("KPOE", "Fort Polk", "Louisiana", 31.1556, -92.9761),
    station("KPUX", "Pueblo", "Colorado", 38.4594, -104.1814),
    station("KRAX", "Raleigh/Durham", "North Carolina", 35.6656, -78.4897),
    station("KRGX", "Reno", "Nevada", 39.7542, -119.4622),
    station("KRIW", "Riverton", "Wyoming", 43.0661, -108.4769),
    station("KRLX", "Charleston", "West Virginia", 38.3111, -81.7231),
    station("KRMX", "Griffiss AFB", "New York", 43.4678, -75.4581),
    station("KRTX", "Portland", "Oregon", 45.7150, -122.9653),
    station("KSFX", "Pocatello/Idaho Falls", "Idaho", 43.1058, -112.6856),
    station("KSGF", "Springfield", "Missouri", 37.2353, -93.4006),
    station("KSHV", "Shreveport", "Louisiana", 32.4506, -93.8414),
    station("KSJT", "San Angelo", "Texas", 31.3711, -100.4925),
    station("KSOX", "Santa Ana Mountains", "California", 33.8175, -117.6361),
    station("KSRX", "Western Arkansas", "Arkansas", 35.2906, -94.3619),
    station("KTBW", "Tampa Bay", "Florida", 27.7056, -82.4017),
    station("KTFX", "Great Falls", "Montana", 47.4597, -111.3853),
    station("KTLH", "Tallahassee", "Florida", 30.3975, -84.3289),
    station("KTLX", "Oklahoma City", "Oklahoma", 35.3331, -97.2778),
    station("KTWX", "Topeka", "Kansas", 38.9969, -96.2322),
    station("KTYX", "Montpelier", "New York", 43.7556, -75.6800),
    station("KUDX", "Rapid City", "South Dakota", 44.1250, -102.8297),
    station("KUEX", "Hastings", "Nebraska", 40.3208, -98.4417),
    station("KVAX", "Moody AFB", "Georgia", 30.8903, -83.0019),
    station("KVBX", "Vandenberg AFB", "California", 34.8381, -120.3978),
    station("KVNX", "Vance AFB", "Oklahoma", 36.7406, -98.1281),
    station("KVTX", "Los Angeles", "California", 34.4119, -119.1797),
    station("KVWX", "Evansville", "Indiana", 38.2600, -87.7244),
    station("KYUX", "Yuma", "Arizona", 32.4953, -114.6567),
];

/// Exact, case-sensitive lookup. Callers normalise user input first.
pub fn find_station(id: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|station| station.id == id)
}

/// Upper-cases and trims a user supplied identifier.
pub fn normalize_station_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// All stations ordered by region, then identifier.
pub fn stations_by_region() -> Vec<&'static Station> {
    let mut stations: Vec<&'static Station> = STATIONS.iter().collect();
    stations.sort_by(|left, right| {
        left.region
            .cmp(right.region)
            .then_with(|| left.id.cmp(right.id))
    });
    stations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn station_ids_are_unique_four_letter_codes() {
        let mut seen = HashSet::new();
        for station in STATIONS {
            assert_eq!(station.id.len(), 4, "{}", station.id);
            assert!(station.id.chars().all(|c| c.is_ascii_uppercase()));
            assert!(seen.insert(station.id), "duplicate {}", station.id);
        }
    }

    #[test]
    fn coordinates_are_within_wgs84_range() {
        for station in STATIONS {
            assert!((-90.0..=90.0).contains(&station.lat), "{}", station.id);
            assert!((-180.0..=180.0).contains(&station.lon), "{}", station.id);
        }
    }

    #[test]
    fn lookup_returns_exact_directory_entry() {
        let cleveland = find_station("KCLE").expect("KCLE is listed");
        assert_eq!(cleveland.name, "Cleveland");
        assert_eq!(cleveland.region, "Ohio");
        assert_eq!(cleveland.lat, 41.4133);
        assert_eq!(cleveland.lon, -81.8597);
        assert!(find_station("kcle").is_none());
        assert!(find_station("ZZZZ").is_none());
    }

    #[test]
    fn normalize_upper_cases_and_trims() {
        assert_eq!(normalize_station_id(" klwx "), "KLWX");
    }

    #[test]
    fn region_ordering_breaks_ties_by_id() {
        let ordered = stations_by_region();
        assert_eq!(ordered.len(), STATIONS.len());
        for pair in ordered.windows(2) {
            let key = |s: &Station| (s.region, s.id);
            assert!(key(pair[0]) < key(pair[1]));
        }
    }
}
