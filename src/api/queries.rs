//! GraphQL documents sent to the Warcraft Logs v2 client API

pub const REPORT_FIGHTS: &str = r#"
query ReportFights($code: String!, $encounterId: Int!, $difficulty: Int!) {
  reportData {
    report(code: $code) {
      startTime
      fights(encounterID: $encounterId, difficulty: $difficulty) {
        id
        encounterID
        difficulty
        startTime
        endTime
        kill
      }
    }
  }
}
"#;

pub const PLAYER_DETAILS: &str = r#"
query PlayerDetails($code: String!, $fightIds: [Int!]!) {
  reportData {
    report(code: $code) {
      playerDetails(fightIDs: $fightIds)
    }
  }
}
"#;

pub const MASTER_DATA_ACTORS: &str = r#"
query Actors($code: String!) {
  reportData {
    report(code: $code) {
      masterData {
        actors {
          id
          name
          gameID
          type
          subType
        }
      }
    }
  }
}
"#;

pub const EVENTS: &str = r#"
query Events(
  $code: String!, $fightIds: [Int]!, $dataType: EventDataType!, $abilityId: Float,
  $startTime: Float, $endTime: Float, $wipeCutoff: Int
) {
  reportData {
    report(code: $code) {
      events(
        dataType: $dataType
        fightIDs: $fightIds
        abilityID: $abilityId
        startTime: $startTime
        endTime: $endTime
        wipeCutoff: $wipeCutoff
      ) {
        data
        nextPageTimestamp
      }
    }
  }
}
"#;

pub const TABLE: &str = r#"
query Table(
  $code: String!, $fightIds: [Int]!, $dataType: TableDataType!, $abilityId: Float,
  $targetId: Int, $filterExpression: String, $wipeCutoff: Int
) {
  reportData {
    report(code: $code) {
      table(
        dataType: $dataType
        fightIDs: $fightIds
        abilityID: $abilityId
        targetID: $targetId
        filterExpression: $filterExpression
        wipeCutoff: $wipeCutoff
      )
    }
  }
}
"#;
