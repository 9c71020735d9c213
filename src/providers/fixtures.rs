//! Sample payloads shared by provider and client tests

pub const DAILY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ValCurs Date="17.10.2026" name="Foreign Currency Market">
    <Valute ID="R01235">
        <NumCode>840</NumCode>
        <CharCode>USD</CharCode>
        <Nominal>1</Nominal>
        <Name>US Dollar</Name>
        <Value>81,2500</Value>
        <VunitRate>81,25</VunitRate>
    </Valute>
    <Valute ID="R01820">
        <NumCode>392</NumCode>
        <CharCode>JPY</CharCode>
        <Nominal>100</Nominal>
        <Name>Japanese Yen</Name>
        <Value>54,3210</Value>
        <VunitRate>0,54321</VunitRate>
    </Valute>
    <Valute ID="R01010">
        <NumCode>036</NumCode>
        <CharCode>AUD</CharCode>
        <Nominal>1</Nominal>
        <Name>Australian Dollar</Name>
        <Value>52.1234</Value>
    </Valute>
</ValCurs>"#;

pub const DAILY_JSON: &str = r#"{
    "Date": "2026-10-18T11:30:00+03:00",
    "PreviousDate": "2026-10-17T11:30:00+03:00",
    "PreviousURL": "//www.cbr-xml-daily.ru/archive/2026/10/17/daily_json.js",
    "Timestamp": "2026-10-17T20:00:00+03:00",
    "Valute": {
        "USD": {
            "ID": "R01235",
            "NumCode": "840",
            "CharCode": "USD",
            "Nominal": 1,
            "Name": "US Dollar",
            "Value": 81.3,
            "Previous": 81.25
        },
        "JPY": {
            "ID": "R01820",
            "NumCode": "392",
            "CharCode": "JPY",
            "Nominal": 100,
            "Name": "Japanese Yen",
            "Value": 54.4011,
            "Previous": 54.321
        },
        "AUD": {
            "ID": "R01010",
            "NumCode": "036",
            "CharCode": "AUD",
            "Nominal": 1,
            "Name": "Australian Dollar",
            "Value": 52.2,
            "Previous": 52.1234
        }
    }
}"#;
