use linetrie::{Encodable, TrieReader, TrieWriter};
use serde_json::json;

fn main() {
    // build a redirect table
    let mut writer = TrieWriter::new();
    writer.insert("/docs", json!({"to": "/documentation", "code": 301}));
    writer.insert("/docs/install", json!({"to": "/documentation/setup", "code": 301}));
    writer.insert("/blog/2019", json!("/archive"));
    writer.insert("/blog/2020", json!("/archive"));
    writer.insert("/beta", true);

    // serialize the table, identical values are only written once
    let out = writer.stringify();
    println!("Serialized table ({} bytes):", out.len());
    print!("{out}");

    // open the serialized table as a TrieReader
    // this accepts any type which implements AsRef<[u8]>
    let reader = TrieReader::new(out.as_str());

    // lookups only decode the lines between the root and the target
    assert_eq!(reader.find("/blog/2019").unwrap(), Some(json!("/archive")));
    assert_eq!(reader.find("/beta").unwrap(), Some(json!(true)));
    assert_eq!(reader.find("/blog").unwrap(), None);

    // the writer and reader agree on every path
    for (path, value) in writer.iter() {
        assert_eq!(reader.find(&path).unwrap().as_ref(), Some(value));
    }

    // a reader over `Bytes` can be re-encoded without decoding
    let bytes = writer.encode_to_reader().encode_to_bytes();
    assert_eq!(bytes.as_ref(), out.as_bytes());

    // or fully decoded back into a writer
    let rebuilt = reader.decode_to_writer().unwrap();
    assert_eq!(rebuilt.len(), writer.len());

    println!("Success!");
}
