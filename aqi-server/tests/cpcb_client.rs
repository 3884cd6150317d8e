use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aqi_server::cpcb::{CpcbClient, FeedConfig, FeedError, StationFeed, nearest_station};
use aqi_server::domain::Coordinate;

fn client(server: &MockServer) -> CpcbClient {
    let config = FeedConfig::new(format!("{}/caaqms/feed", server.uri())).with_timeout(5);
    CpcbClient::new(config).unwrap()
}

#[tokio::test]
async fn fetches_and_matches_nearest_station() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/caaqms/feed"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "country": [
                {
                    "stateName": "Delhi",
                    "citiesInState": [{
                        "cityName": "Delhi",
                        "stationsInCity": [
                            {"stationName": "ITO, Delhi - CPCB", "latitude": "28.628624", "longitude": "77.241060", "airQualityIndexValue": "212"},
                            {"stationName": "Anand Vihar, Delhi - DPCC", "latitude": 28.646835, "longitude": 77.316032}
                        ]
                    }]
                },
                {"stateName": "Nowhere", "citiesInState": null}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feed = client(&server).load().await.unwrap();
    assert_eq!(feed.stations().count(), 2);

    let station = nearest_station(&feed, Coordinate::new(28.63, 77.24)).unwrap();
    assert_eq!(station.name, "ITO, Delhi - CPCB");
    assert_eq!(station.feed_aqi, Some(212.0));
    assert!(station.distance_km < 1.0);
}

#[tokio::test]
async fn error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).fetch().await.unwrap_err();
    match err {
        FeedError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch().await.unwrap_err();
    assert!(matches!(err, FeedError::Json { .. }), "{err:?}");
}

#[tokio::test]
async fn feed_without_country_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let feed = client(&server).fetch().await.unwrap();
    assert_eq!(feed.stations().count(), 0);
    assert!(nearest_station(&feed, Coordinate::new(28.6, 77.2)).is_none());
}
