//! Builtins written in guest code
//!
//! Anything that has to call back into guest functions lives here, so it runs
//! on the state stack like user code and can be paused, stepped and thrown
//! through. The text is parsed without source positions and executed once
//! while the interpreter is constructed.

pub(crate) const POLYFILLS: &str = r#"
(function () {
  function define(target, name, value) {
    Object.defineProperty(target, name, {
      value: value, writable: true, enumerable: false, configurable: true
    });
  }

  function callable(fn) {
    if (typeof fn !== 'function') {
      throw new TypeError(fn + ' is not a function');
    }
    return fn;
  }

  var ArrayProto = Array.prototype;

  define(ArrayProto, 'forEach', function forEach(callback, thisArg) {
    var O = Object(this), len = O.length >>> 0;
    callable(callback);
    for (var k = 0; k < len; k++) {
      if (k in O) {
        callback.call(thisArg, O[k], k, O);
      }
    }
  });

  define(ArrayProto, 'map', function map(callback, thisArg) {
    var O = Object(this), len = O.length >>> 0;
    callable(callback);
    var A = new Array(len);
    for (var k = 0; k < len; k++) {
      if (k in O) {
        A[k] = callback.call(thisArg, O[k], k, O);
      }
    }
    return A;
  });

  define(ArrayProto, 'filter', function filter(callback, thisArg) {
    var O = Object(this), len = O.length >>> 0;
    callable(callback);
    var A = [];
    for (var k = 0; k < len; k++) {
      if (k in O) {
        var value = O[k];
        if (callback.call(thisArg, value, k, O)) {
          A.push(value);
        }
      }
    }
    return A;
  });

  define(ArrayProto, 'every', function every(callback, thisArg) {
    var O = Object(this), len = O.length >>> 0;
    callable(callback);
    for (var k = 0; k < len; k++) {
      if (k in O && !callback.call(thisArg, O[k], k, O)) {
        return false;
      }
    }
    return true;
  });

  define(ArrayProto, 'some', function some(callback, thisArg) {
    var O = Object(this), len = O.length >>> 0;
    callable(callback);
    for (var k = 0; k < len; k++) {
      if (k in O && callback.call(thisArg, O[k], k, O)) {
        return true;
      }
    }
    return false;
  });

  define(ArrayProto, 'reduce', function reduce(callback, initialValue) {
    var O = Object(this), len = O.length >>> 0, k = 0, acc;
    callable(callback);
    if (arguments.length >= 2) {
      acc = initialValue;
    } else {
      while (k < len && !(k in O)) {
        k++;
      }
      if (k >= len) {
        throw new TypeError('Reduce of empty array with no initial value');
      }
      acc = O[k++];
    }
    for (; k < len; k++) {
      if (k in O) {
        acc = callback(acc, O[k], k, O);
      }
    }
    return acc;
  });

  define(ArrayProto, 'reduceRight', function reduceRight(callback, initialValue) {
    var O = Object(this), len = O.length >>> 0, k = len - 1, acc;
    callable(callback);
    if (arguments.length >= 2) {
      acc = initialValue;
    } else {
      while (k >= 0 && !(k in O)) {
        k--;
      }
      if (k < 0) {
        throw new TypeError('Reduce of empty array with no initial value');
      }
      acc = O[k--];
    }
    for (; k >= 0; k--) {
      if (k in O) {
        acc = callback(acc, O[k], k, O);
      }
    }
    return acc;
  });

  function defaultCompare(a, b) {
    var x = String(a), y = String(b);
    return x < y ? -1 : (x > y ? 1 : 0);
  }

  // Stable merge sort; holes and undefined values end up at the back
  define(ArrayProto, 'sort', function sort(comparefn) {
    var O = Object(this), len = O.length >>> 0;
    if (comparefn !== undefined) {
      callable(comparefn);
    }
    var compare = comparefn || defaultCompare;
    var values = [], undefinedCount = 0, k;
    for (k = 0; k < len; k++) {
      if (k in O) {
        if (O[k] === undefined) {
          undefinedCount++;
        } else {
          values.push(O[k]);
        }
      }
    }

    var buffer = new Array(values.length);
    for (var width = 1; width < values.length; width *= 2) {
      for (var lo = 0; lo < values.length; lo += 2 * width) {
        var mid = Math.min(lo + width, values.length);
        var hi = Math.min(lo + 2 * width, values.length);
        var i = lo, j = mid, out = lo;
        while (i < mid && j < hi) {
          if (compare(values[j], values[i]) < 0) {
            buffer[out++] = values[j++];
          } else {
            buffer[out++] = values[i++];
          }
        }
        while (i < mid) {
          buffer[out++] = values[i++];
        }
        while (j < hi) {
          buffer[out++] = values[j++];
        }
      }
      var swap = values;
      values = buffer;
      buffer = swap;
    }

    for (k = 0; k < values.length; k++) {
      O[k] = values[k];
    }
    for (var u = 0; u < undefinedCount; u++) {
      O[k++] = undefined;
    }
    for (; k < len; k++) {
      delete O[k];
    }
    return O;
  });

  define(ArrayProto, 'toLocaleString', function toLocaleString() {
    var O = Object(this), len = O.length >>> 0, parts = [];
    for (var k = 0; k < len; k++) {
      var element = O[k];
      parts.push(element === undefined || element === null ? '' : element.toLocaleString());
    }
    return parts.join(',');
  });

  var nativeReplace = String.prototype.replace;

  // Function replacers are called from here; string replacements go to the
  // native implementation
  define(String.prototype, 'replace', function replace(pattern, replacement) {
    if (typeof replacement !== 'function') {
      return nativeReplace.call(this, pattern, replacement);
    }
    var str = String(this), matches = [], match;
    if (pattern instanceof RegExp) {
      if (pattern.global) {
        pattern.lastIndex = 0;
        while ((match = pattern.exec(str)) !== null) {
          matches.push(match);
          if (match[0] === '') {
            pattern.lastIndex++;
          }
        }
      } else if ((match = pattern.exec(str)) !== null) {
        matches.push(match);
      }
    } else {
      var needle = String(pattern), index = str.indexOf(needle);
      if (index !== -1) {
        match = [needle];
        match.index = index;
        matches.push(match);
      }
    }

    var result = '', last = 0;
    for (var m = 0; m < matches.length; m++) {
      match = matches[m];
      var args = [];
      for (var g = 0; g < match.length; g++) {
        args.push(match[g]);
      }
      args.push(match.index, str);
      result += str.slice(last, match.index) + String(replacement.apply(undefined, args));
      last = match.index + match[0].length;
    }
    return result + str.slice(last);
  });
})();
"#;
