use jsengine::{JsValue, Runtime};
#[test]
fn dbg() {
    let mut cx = Runtime::new().create_context();
    let v: JsValue = cx.eval("3 + 4").unwrap();
    println!("RESULT = {:?} num={}", v, v.to_number());
    let v2 = cx.eval("let x = 3+4; x").unwrap();
    println!("RESULT2 = {:?} num={}", v2, v2.to_number());
}
