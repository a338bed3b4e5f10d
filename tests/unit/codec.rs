use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use stitch_cli::yy::{self, EOL};

/// An object descriptor exactly as the IDE writes it.
fn object_descriptor() -> String {
    [
        "{",
        "  \"spriteId\": {",
        "    \"name\": \"spr_player\",",
        "    \"path\": \"sprites/spr_player/spr_player.yy\",",
        "  },",
        "  \"solid\": false,",
        "  \"visible\": true,",
        "  \"parentObjectId\": null,",
        "  \"physicsDensity\": 0.5,",
        "  \"eventList\": [",
        "    {\"isDnD\":false,\"eventNum\":0,\"eventType\":0,\"collisionObjectId\":null,\"resourceVersion\":\"1.0\",\"name\":\"\",\"tags\":[],\"resourceType\":\"GMEvent\",},",
        "    {\"isDnD\":false,\"eventNum\":0,\"eventType\":4,\"collisionObjectId\":{\"name\":\"obj_wall\",\"path\":\"objects/obj_wall/obj_wall.yy\",},\"resourceVersion\":\"1.0\",\"name\":\"\",\"tags\":[],\"resourceType\":\"GMEvent\",},",
        "  ],",
        "  \"properties\": [],",
        "  \"parent\": {",
        "    \"name\": \"Objects\",",
        "    \"path\": \"folders/Objects.yy\",",
        "  },",
        "  \"resourceVersion\": \"1.0\",",
        "  \"name\": \"obj_player\",",
        "  \"tags\": [],",
        "  \"resourceType\": \"GMObject\",",
        "}",
    ]
    .join(EOL)
}

#[test]
fn test_ide_descriptor_is_reproduced_byte_for_byte() -> Result<()> {
    let text = object_descriptor();
    let value = yy::parse(&text)?;
    assert_eq!(value["eventList"][1]["collisionObjectId"]["name"], "obj_wall");
    assert_eq!(yy::stringify(&value), text);
    Ok(())
}

#[test]
fn test_compact_json_is_normalized() -> Result<()> {
    let compact = "\u{feff}{\"name\":\"snd_theme\",\"duration\":12.5,\"parent\":{\"name\":\"Audio\",\"path\":\"folders/Audio.yy\"},\"tags\":[\"music\",]}";
    let value = yy::parse(compact)?;
    let expected = [
        "{",
        "  \"name\": \"snd_theme\",",
        "  \"duration\": 12.5,",
        "  \"parent\": {",
        "    \"name\": \"Audio\",",
        "    \"path\": \"folders/Audio.yy\",",
        "  },",
        "  \"tags\": [",
        "    \"music\",",
        "  ],",
        "}",
    ]
    .join(EOL);
    assert_eq!(yy::stringify(&value), expected);
    Ok(())
}

#[test]
fn test_commas_inside_strings_survive() -> Result<()> {
    let value = yy::parse("{\"code\": \"a,]\", \"list\": [\"x,}\",],}")?;
    assert_eq!(value, json!({"code": "a,]", "list": ["x,}"]}));
    Ok(())
}

#[test]
fn test_sixty_four_bit_ids_are_exact() -> Result<()> {
    let text = "{\"seed\": 18446744073709551615, \"offset\": -9223372036854775808,}";
    let value = yy::parse(text)?;
    assert_eq!(value["seed"].as_u64(), Some(u64::MAX));
    let out = yy::stringify(&value);
    assert!(out.contains("18446744073709551615"));
    assert!(out.contains("-9223372036854775808"));
    Ok(())
}

#[derive(Debug, Deserialize, PartialEq)]
struct FolderRef {
    name: String,
    path: String,
}

#[test]
fn test_typed_parse() -> Result<()> {
    let folder: FolderRef = yy::from_str("{\"name\": \"UI\", \"path\": \"folders/UI.yy\",}")?;
    assert_eq!(
        folder,
        FolderRef {
            name: "UI".to_string(),
            path: "folders/UI.yy".to_string(),
        }
    );
    assert!(yy::parse("{\"name\": }").is_err());
    Ok(())
}
