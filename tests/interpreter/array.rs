//! Array-related tests

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_array() {
    assert_eq!(eval("var arr = [1, 2, 3]; arr[1]"), Value::Number(2.0));
    assert_eq!(eval("[1, 2, 3].length"), Value::Number(3.0));
    assert_eq!(eval("[,].length"), Value::Number(1.0));
}

#[test]
fn test_sort_join_round_trip() {
    assert_eq!(eval("[3, 1, 2].sort().join(',')"), s("1,2,3"));
}

#[test]
fn test_sort_default_is_string_order() {
    assert_eq!(eval("[10, 9, 1, 100].sort().join()"), s("1,10,100,9"));
}

#[test]
fn test_sort_with_comparator_is_stable() {
    let code = r#"
        var items = [
            {k: 2, id: 'a'}, {k: 1, id: 'b'}, {k: 2, id: 'c'}, {k: 1, id: 'd'}
        ];
        items.sort(function (x, y) { return x.k - y.k; });
        items.map(function (x) { return x.id; }).join('')
    "#;
    assert_eq!(eval(code), s("bdac"));
}

#[test]
fn test_sort_puts_undefined_and_holes_last() {
    assert_eq!(eval("var a = [3, undefined, 1, , 2]; a.sort(); a.join('-') + '|' + a.length"), s("1-2-3--|5"));
    assert_eq!(eval("var a = [3, , 1]; a.sort(); 2 in a"), Value::Boolean(false));
}

#[test]
fn test_length_tracks_highest_index() {
    assert_eq!(eval("var a = []; a[5] = 'x'; a.length"), Value::Number(6.0));
    assert_eq!(eval("var a = [1, 2]; a['7'] = 1; a.length"), Value::Number(8.0));
    assert_eq!(eval("var a = [1, 2]; a.foo = 1; a.length"), Value::Number(2.0));
}

#[test]
fn test_setting_length_truncates() {
    assert_eq!(eval("var a = [1, 2, 3, 4]; a.length = 2; a.join(',')"), s("1,2"));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; 2 in a"), Value::Boolean(false));
    assert_eq!(eval("var a = [1]; a.length = 3; a.length"), Value::Number(3.0));
}

#[test]
fn test_invalid_length_throws() {
    assert!(throws_error("var a = []; a.length = -1", "Invalid array length"));
    assert!(throws_error("new Array(1.5)", "Invalid array length"));
}

#[test]
fn test_array_constructor() {
    assert_eq!(eval("new Array(3).length"), Value::Number(3.0));
    assert_eq!(eval("new Array(1, 2).join()"), s("1,2"));
    assert_eq!(eval("Array('a').length"), Value::Number(1.0));
    assert_eq!(eval("Array.isArray([])"), Value::Boolean(true));
    assert_eq!(eval("Array.isArray({length: 0})"), Value::Boolean(false));
}

#[test]
fn test_push_pop_shift_unshift() {
    assert_eq!(eval("var a = [1, 2]; a.push(3, 4)"), Value::Number(4.0));
    assert_eq!(eval("var a = [1, 2]; a.pop() + a.length"), Value::Number(3.0));
    assert_eq!(eval("var a = [1, 2, 3]; a.shift() + ':' + a.join()"), s("1:2,3"));
    assert_eq!(eval("var a = [3]; a.unshift(1, 2) + ':' + a.join()"), s("3:1,2,3"));
    assert_eq!(eval("[].pop()"), Value::Undefined);
}

#[test]
fn test_splice() {
    assert_eq!(eval("var a = [1, 2, 3, 4, 5]; var r = a.splice(1, 2); r.join() + '|' + a.join()"), s("2,3|1,4,5"));
    assert_eq!(eval("var a = [1, 5]; a.splice(1, 0, 2, 3, 4); a.join()"), s("1,2,3,4,5"));
    assert_eq!(eval("var a = [1, 2, 3]; a.splice(-1); a.join()"), s("1,2"));
}

#[test]
fn test_slice_concat_reverse() {
    assert_eq!(eval("[1, 2, 3, 4].slice(1, -1).join()"), s("2,3"));
    assert_eq!(eval("[1].concat([2, 3], 4, [[5]]).length"), Value::Number(5.0));
    assert_eq!(eval("[1, 2, 3].reverse().join('')"), s("321"));
}

#[test]
fn test_index_of() {
    assert_eq!(eval("[1, 2, 3, 2].indexOf(2)"), Value::Number(1.0));
    assert_eq!(eval("[1, 2, 3, 2].lastIndexOf(2)"), Value::Number(3.0));
    assert_eq!(eval("[1, 2, 3].indexOf('2')"), Value::Number(-1.0));
    assert_eq!(eval("[NaN].indexOf(NaN)"), Value::Number(-1.0));
}

#[test]
fn test_join_with_null_and_nested() {
    assert_eq!(eval("[1, null, undefined, [2, 3]].join('-')"), s("1---2,3"));
    assert_eq!(eval("var a = [1]; a.push(a); a.join()"), s("1,"));
}

#[test]
fn test_iteration_methods() {
    assert_eq!(eval("[1, 2, 3].map(function (x) { return x * 2; }).join()"), s("2,4,6"));
    assert_eq!(eval("[1, 2, 3, 4].filter(function (x) { return x % 2; }).join()"), s("1,3"));
    assert_eq!(eval("[1, 2, 3].reduce(function (a, b) { return a + b; })"), Value::Number(6.0));
    assert_eq!(eval("['a', 'b', 'c'].reduceRight(function (a, b) { return a + b; }, '')"), s("cba"));
    assert_eq!(eval("[1, 2, 3].some(function (x) { return x > 2; })"), Value::Boolean(true));
    assert_eq!(eval("[1, 2, 3].every(function (x) { return x > 2; })"), Value::Boolean(false));
    assert_eq!(eval("var n = 0; [1, 2, 3].forEach(function (x) { n += x; }); n"), Value::Number(6.0));
}

#[test]
fn test_callback_receives_index_and_this() {
    let code = r#"
        var ctx = {mult: 10};
        [5, 6].map(function (x, i, arr) { return x * this.mult + i + arr.length; }, ctx).join()
    "#;
    assert_eq!(eval(code), s("52,63"));
}

#[test]
fn test_iteration_skips_holes() {
    assert_eq!(eval("var n = 0; [1, , 3].forEach(function () { n++; }); n"), Value::Number(2.0));
}

#[test]
fn test_reduce_empty_throws() {
    assert!(throws_error("[].reduce(function (a, b) { return a + b; })", "Reduce of empty array"));
}

#[test]
fn test_map_with_non_function_throws() {
    assert!(throws_error("[1].map(3)", "is not a function"));
}

#[test]
fn test_exception_in_callback_propagates() {
    let code = r#"
        var r;
        try {
            [1, 2].forEach(function (x) { if (x == 2) throw 'stop at ' + x; });
        } catch (e) { r = e; }
        r
    "#;
    assert_eq!(eval(code), s("stop at 2"));
}

#[test]
fn test_generic_methods_on_array_likes() {
    assert_eq!(
        eval("var o = {length: 2, 0: 'a', 1: 'b'}; Array.prototype.push.call(o, 'c'); o.length + o[2]"),
        s("3c")
    );
    assert_eq!(
        eval("(function () { return Array.prototype.slice.call(arguments, 1).join(); })(1, 2, 3)"),
        s("2,3")
    );
}

#[test]
fn test_to_string_and_to_locale_string() {
    assert_eq!(eval("[1, [2, 3]].toString()"), s("1,2,3"));
    assert_eq!(eval("[1, null, 'a'].toLocaleString()"), s("1,,a"));
}
